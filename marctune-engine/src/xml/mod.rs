//! Record-oriented XML reading and serialization

pub mod node;
pub mod reader;
pub mod tag;

pub use node::{RecordNode, XmlNode};
pub use reader::RecordReader;
pub use tag::{RecordTag, MARC21_SLIM_NS};
