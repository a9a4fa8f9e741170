// Copyright 2020 TiKV Project Authors. Licensed under Apache-2.0.

mod test_checkpoint;
mod test_recovery;
