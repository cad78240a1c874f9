// Server-side error reporting. Full detail goes to the log, never to clients.

use crate::types::Categorized;

/// Log an error with its category and code.
///
/// Internal failures are logged at `error`, client-caused failures at `warn`.
pub fn report<E>(context: &str, error: &E)
where
    E: Categorized + ?Sized,
{
    let category = error.category();
    if category.is_client_error() {
        tracing::warn!(
            context = context,
            error_code = error.code(),
            error_type = %category,
            error = %error,
            "Request rejected"
        );
    } else {
        tracing::error!(
            context = context,
            error_code = error.code(),
            error_type = %category,
            error = %error,
            "Request failed"
        );
    }
}
