use crate::commands::{Command, Session};
use crate::domain::FeedWithCreator;
use crate::errors::GatorResult;
use crate::services::FeedService;

fn print_feed(entry: &FeedWithCreator) {
    println!("  Name:    {}", entry.feed.name);
    println!("  URL:     {}", entry.feed.url);
    println!("  Creator: {}", entry.creator);
    match entry.feed.last_fetched_at {
        Some(at) => println!("  Fetched: {}", at.format("%Y-%m-%d %H:%M:%S UTC")),
        None => println!("  Fetched: never"),
    }
}

pub fn add(session: &mut Session<'_>, command: &Command) -> GatorResult<()> {
    let args = command.expect_args(2, "<name> <url>")?;
    let user = session.current_user()?;

    let feed = FeedService::new(session.store).add(user, &args[0], &args[1])?;

    println!("Feed added successfully!");
    print_feed(&FeedWithCreator {
        feed,
        creator: user.name.clone(),
    });
    Ok(())
}

pub fn list(session: &mut Session<'_>, command: &Command) -> GatorResult<()> {
    command.expect_args(0, "")?;

    let feeds = FeedService::new(session.store).list()?;
    if feeds.is_empty() {
        println!("No feeds configured.");
        return Ok(());
    }

    for (i, entry) in feeds.iter().enumerate() {
        println!("-------- Feed: {} ------->", i + 1);
        print_feed(entry);
        println!("<------- Feed: {} --------", i + 1);
    }
    Ok(())
}

pub fn follow(session: &mut Session<'_>, command: &Command) -> GatorResult<()> {
    let url = &command.expect_args(1, "<url>")?[0];
    let user = session.current_user()?;

    let entry = FeedService::new(session.store).follow(user, url)?;

    println!("{} is now following:", user.name);
    print_feed(&entry);
    Ok(())
}

pub fn following(session: &mut Session<'_>, command: &Command) -> GatorResult<()> {
    command.expect_args(0, "")?;
    let user = session.current_user()?;

    let feeds = FeedService::new(session.store).following(user)?;
    if feeds.is_empty() {
        println!("{} is not following any feeds.", user.name);
        return Ok(());
    }

    println!("Feeds followed by {}:", user.name);
    for entry in feeds {
        println!(" * {} - {}", entry.creator, entry.feed.name);
    }
    Ok(())
}

pub fn unfollow(session: &mut Session<'_>, command: &Command) -> GatorResult<()> {
    let url = &command.expect_args(1, "<url>")?[0];
    let user = session.current_user()?;

    if FeedService::new(session.store).unfollow(user, url)? {
        println!("Unfollowed {}", url);
    } else {
        println!("{} was not following {}", user.name, url);
    }
    Ok(())
}
