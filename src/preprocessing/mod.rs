//! Feature preprocessing

mod encoder;

pub use encoder::LabelEncoder;
