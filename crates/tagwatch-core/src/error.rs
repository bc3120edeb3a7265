use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Tag identifier too long: {len} bytes (limit {max})")]
    UidTooLong { len: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
