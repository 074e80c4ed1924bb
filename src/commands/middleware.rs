use tracing::debug;

use crate::commands::{Command, Session};
use crate::errors::{GatorError, GatorResult};

/// Resolve the configured current user into the session, or fail the chain.
pub fn require_user(session: &mut Session<'_>, _command: &Command) -> GatorResult<()> {
    let name = session.config.current_user_name.clone().ok_or_else(|| {
        GatorError::UserResolution("no current user configured, run `register` or `login`".to_string())
    })?;

    let user = session
        .store
        .users
        .get_by_name(&name)?
        .ok_or_else(|| GatorError::UserResolution(format!("user {} does not exist", name)))?;

    debug!(user = %user.name, "resolved current user");
    session.user = Some(user);
    Ok(())
}
