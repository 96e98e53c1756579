pub mod context;
pub mod parser;
pub mod template;
pub mod value;

pub mod prelude {
	pub use super::{context::Context, parser::TemplateError, template::Template, value::Value};
}
