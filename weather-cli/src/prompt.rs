use inquire::Confirm;
use tracing::debug;

/// Ask a yes/no question on the terminal. Anything but an explicit "yes",
/// including a closed or missing terminal, counts as "no".
pub fn confirm(question: &str) -> bool {
    match Confirm::new(question).with_default(false).prompt() {
        Ok(answer) => answer,
        Err(err) => {
            debug!("prompt aborted: {err}");
            false
        }
    }
}
