//! `.wsb` codec: XML decoding, schema validation and XML encoding

pub mod error;
pub mod parser;
pub mod serializer;
pub mod tree;
pub mod validator;

pub use error::{CodecError, ValidationError, ValidationIssue};
pub use parser::{parse, parse_file, read_document};
pub use serializer::{serialize, serialize_node, serialize_value, write_file, XML_DECLARATION};
pub use tree::{Element, Node};
pub use validator::{validate, validate_config, validate_value};
