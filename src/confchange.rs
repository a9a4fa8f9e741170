// Copyright 2020 TiKV Project Authors. Licensed under Apache-2.0.

mod changer;

pub(crate) use self::changer::{Changer, MapChange, MapChangeType};
