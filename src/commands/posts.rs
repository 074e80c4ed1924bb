use crate::commands::{Command, Session};
use crate::errors::GatorResult;
use crate::services::{PostService, DEFAULT_BROWSE_LIMIT};

/// Parse the optional `[limit]` argument.
fn browse_limit(command: &Command) -> GatorResult<usize> {
    match command.args.as_slice() {
        [] => Ok(DEFAULT_BROWSE_LIMIT),
        [raw] => raw
            .parse::<usize>()
            .map_err(|_| command.usage_error("[limit]")),
        _ => Err(command.usage_error("[limit]")),
    }
}

pub fn browse(session: &mut Session<'_>, command: &Command) -> GatorResult<()> {
    let limit = browse_limit(command)?;
    let user = session.current_user()?;

    let posts = PostService::new(session.store).browse(user, limit)?;

    println!("Found {} posts for user {}:", posts.len(), user.name);
    for entry in posts {
        let post = &entry.post;
        match post.published_at {
            Some(at) => println!("{} from {}", at.format("%a %b %d"), entry.feed_name),
            None => println!("from {}", entry.feed_name),
        }
        println!("--- {} ---", post.title);
        if let Some(description) = &post.description {
            println!("    {}", description);
        }
        println!("Link: {}", post.url);
        println!("=====================================");
    }
    Ok(())
}
