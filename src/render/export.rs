use crate::action::InvokedAction;
use crate::context::Context;
use crate::export::{Export, Order};
use crate::render::Renderer;

/// JSON wire format, ordered by display text.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExportRenderer;

impl Renderer for ExportRenderer {
    fn render(&self, invoked: &InvokedAction, context: &Context) -> String {
        Export::new(invoked.clone(), &context.value, Order::Display).to_json()
    }
}
