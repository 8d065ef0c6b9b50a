use crate::filter::Join;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum FilterError {
    #[error("no filters were given to join")]
    EmptyJoin,
    #[error("a group with {entries} entries must be joined by \"and\" or \"or\"")]
    MissingJoin { entries: usize },
    #[error("a group with {entries} entries must not carry a {join:?} join")]
    ExtraJoin { join: Join, entries: usize },
}
