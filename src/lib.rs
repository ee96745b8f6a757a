// Copyright 2026 the terminfo-db authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Decoder for compiled terminfo database files with an alias-keyed
//! lookup cache

pub mod caps;
pub mod decode;
mod decoder;
pub mod locate;

pub use decode::{Error, Terminfo, decode};
pub use locate::Database;
