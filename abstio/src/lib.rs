//! Reading and writing files, and talking to remote servers. Everything that touches the outside
//! world goes through here, so the rest of the workspace stays pure.

#[macro_use]
extern crate log;

pub use download::post_text;
pub use io::{maybe_read_json, slurp_file, write_json, write_string};

mod download;
mod io;
