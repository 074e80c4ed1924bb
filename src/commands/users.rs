use crate::commands::{Command, Session};
use crate::errors::GatorResult;
use crate::services::UserService;

pub fn register(session: &mut Session<'_>, command: &Command) -> GatorResult<()> {
    let name = &command.expect_args(1, "<name>")?[0];

    let user = UserService::new(session.store).register(name)?;
    session.config.set_user(&user.name)?;

    println!("User registered successfully: {}", user.name);
    println!("  ID: {}", user.id);
    Ok(())
}

pub fn login(session: &mut Session<'_>, command: &Command) -> GatorResult<()> {
    let name = &command.expect_args(1, "<name>")?[0];

    let user = UserService::new(session.store).get(name)?;
    session.config.set_user(&user.name)?;

    println!("User switched successfully!");
    Ok(())
}

pub fn list(session: &mut Session<'_>, command: &Command) -> GatorResult<()> {
    command.expect_args(0, "")?;

    let users = UserService::new(session.store).list()?;
    if users.is_empty() {
        println!("No users registered.");
        return Ok(());
    }

    let current = session.config.current_user_name.as_deref();
    for user in users {
        if Some(user.name.as_str()) == current {
            println!("* {} (current)", user.name);
        } else {
            println!("* {}", user.name);
        }
    }
    Ok(())
}

pub fn reset(session: &mut Session<'_>, command: &Command) -> GatorResult<()> {
    command.expect_args(0, "")?;

    UserService::new(session.store).reset()?;
    println!("Database reset successfully!");
    Ok(())
}
