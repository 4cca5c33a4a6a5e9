use crate::storage::ConversationSummary;

/// The user-facing side of the widget that the controller talks back to
pub trait ChatSurface: Send + Sync {
    /// Ask a yes/no question; `false` aborts the pending operation
    fn confirm(&self, question: &str) -> bool;

    /// Show a blocking notice to the user
    fn alert(&self, message: &str);

    /// Redraw the history list, highlighting `active_id`
    fn render_history(&self, summaries: &[ConversationSummary], active_id: Option<i64>);
}
