//! Command dispatch.
//!
//! Each command name maps to an ordered chain of handlers. Middleware such as
//! [`middleware::require_user`] runs first and may fill in the [`Session`];
//! the last handler is the action itself. The first error stops the chain.

pub mod aggregate;
pub mod feeds;
pub mod middleware;
pub mod posts;
pub mod users;

use std::collections::HashMap;

use tracing::{debug, error};

use crate::config::Config;
use crate::domain::User;
use crate::errors::{GatorError, GatorResult};
use crate::shutdown::Shutdown;
use crate::sources::FeedFetcher;
use crate::storage::Store;

/// One invocation: the command name and its positional arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub name: String,
    pub args: Vec<String>,
}

impl Command {
    pub fn new(name: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    /// The arguments, if there are exactly `count` of them.
    pub fn expect_args(&self, count: usize, usage: &str) -> GatorResult<&[String]> {
        if self.args.len() != count {
            return Err(self.usage_error(usage));
        }
        Ok(&self.args)
    }

    pub fn usage_error(&self, usage: &str) -> GatorError {
        let usage = if usage.is_empty() {
            format!("usage: {}", self.name)
        } else {
            format!("usage: {} {}", self.name, usage)
        };
        GatorError::InvalidArgument(usage)
    }
}

/// State shared by the handlers of a single command invocation.
pub struct Session<'a> {
    pub store: &'a Store,
    pub config: &'a mut Config,
    pub fetcher: &'a dyn FeedFetcher,
    pub shutdown: Shutdown,
    /// Set by [`middleware::require_user`].
    pub user: Option<User>,
}

impl<'a> Session<'a> {
    pub fn new(store: &'a Store, config: &'a mut Config, fetcher: &'a dyn FeedFetcher) -> Self {
        Self {
            store,
            config,
            fetcher,
            shutdown: Shutdown::new(),
            user: None,
        }
    }

    /// The user resolved by the auth middleware.
    pub fn current_user(&self) -> GatorResult<&User> {
        self.user.as_ref().ok_or_else(|| {
            GatorError::UserResolution("command requires a logged in user".to_string())
        })
    }
}

pub trait Handler {
    fn handle(&self, session: &mut Session<'_>, command: &Command) -> GatorResult<()>;
}

impl<F> Handler for F
where
    F: Fn(&mut Session<'_>, &Command) -> GatorResult<()>,
{
    fn handle(&self, session: &mut Session<'_>, command: &Command) -> GatorResult<()> {
        self(session, command)
    }
}

pub struct CommandRegistry {
    commands: HashMap<String, Vec<Box<dyn Handler>>>,
}

impl CommandRegistry {
    /// The full command table.
    pub fn new() -> Self {
        let mut registry = Self::empty();

        registry.register("register", vec![Box::new(users::register)]);
        registry.register("login", vec![Box::new(users::login)]);
        registry.register("users", vec![Box::new(users::list)]);
        registry.register("reset", vec![Box::new(users::reset)]);
        registry.register("agg", vec![Box::new(aggregate::agg)]);
        registry.register("feeds", vec![Box::new(feeds::list)]);
        registry.register(
            "addfeed",
            vec![Box::new(middleware::require_user), Box::new(feeds::add)],
        );
        registry.register(
            "follow",
            vec![Box::new(middleware::require_user), Box::new(feeds::follow)],
        );
        registry.register(
            "following",
            vec![Box::new(middleware::require_user), Box::new(feeds::following)],
        );
        registry.register(
            "unfollow",
            vec![Box::new(middleware::require_user), Box::new(feeds::unfollow)],
        );
        registry.register(
            "browse",
            vec![Box::new(middleware::require_user), Box::new(posts::browse)],
        );

        registry
    }

    pub fn empty() -> Self {
        Self {
            commands: HashMap::new(),
        }
    }

    /// Map `name` to `handlers`, replacing any earlier registration.
    pub fn register(&mut self, name: &str, handlers: Vec<Box<dyn Handler>>) {
        self.commands.insert(name.to_string(), handlers);
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.commands.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn run(&self, session: &mut Session<'_>, command: &Command) -> GatorResult<()> {
        let handlers = self
            .commands
            .get(&command.name)
            .ok_or_else(|| GatorError::CommandNotFound(command.name.clone()))?;

        debug!(command = %command.name, steps = handlers.len(), "dispatching");
        for handler in handlers {
            handler.handle(session, command)?;
        }
        Ok(())
    }

    /// Like [`run`](Self::run), but any error ends the process.
    pub fn must_run(&self, session: &mut Session<'_>, command: &Command) {
        if let Err(e) = self.run(session, command) {
            error!(command = %command.name, "command failed: {}", e);
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::sources::traits::MockFeedFetcher;
    use crate::storage::SqliteStorage;
    use tempfile::TempDir;

    /// In-memory store plus a config file in a temp dir.
    pub struct Harness {
        pub store: Store,
        pub config: Config,
        pub fetcher: MockFeedFetcher,
        _dir: TempDir,
    }

    impl Harness {
        pub fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let config = Config::from_file(dir.path().join("config.json")).unwrap();
            Self {
                store: Store::sqlite(SqliteStorage::in_memory().unwrap()),
                config,
                fetcher: MockFeedFetcher::new(),
                _dir: dir,
            }
        }

        pub fn session(&mut self) -> Session<'_> {
            Session::new(&self.store, &mut self.config, &self.fetcher)
        }

        pub fn run(&mut self, name: &str, args: &[&str]) -> GatorResult<()> {
            let command = Command::new(name, args.iter().map(|a| a.to_string()).collect());
            let registry = CommandRegistry::new();
            let mut session = self.session();
            registry.run(&mut session, &command)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::Harness;
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder(log: &Rc<RefCell<Vec<&'static str>>>, name: &'static str) -> Box<dyn Handler> {
        let log = Rc::clone(log);
        Box::new(move |_: &mut Session<'_>, _: &Command| -> GatorResult<()> {
            log.borrow_mut().push(name);
            Ok(())
        })
    }

    fn failing(message: &'static str) -> Box<dyn Handler> {
        Box::new(move |_: &mut Session<'_>, _: &Command| -> GatorResult<()> {
            Err(GatorError::UserResolution(message.to_string()))
        })
    }

    #[test]
    fn test_unknown_command() {
        let mut harness = Harness::new();
        let registry = CommandRegistry::empty();
        let mut session = harness.session();

        let result = registry.run(&mut session, &Command::new("nope", vec![]));

        assert!(matches!(result, Err(GatorError::CommandNotFound(name)) if name == "nope"));
    }

    #[test]
    fn test_handlers_run_in_order() {
        let mut harness = Harness::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut registry = CommandRegistry::empty();
        registry.register(
            "chain",
            vec![recorder(&log, "first"), recorder(&log, "second"), recorder(&log, "third")],
        );

        let mut session = harness.session();
        registry.run(&mut session, &Command::new("chain", vec![])).unwrap();

        assert_eq!(*log.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_first_error_stops_chain() {
        let mut harness = Harness::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut registry = CommandRegistry::empty();
        registry.register(
            "chain",
            vec![recorder(&log, "first"), failing("boom"), recorder(&log, "never")],
        );

        let mut session = harness.session();
        let result = registry.run(&mut session, &Command::new("chain", vec![]));

        assert!(matches!(result, Err(GatorError::UserResolution(m)) if m == "boom"));
        assert_eq!(*log.borrow(), vec!["first"]);
    }

    #[test]
    fn test_reregistering_replaces() {
        let mut harness = Harness::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut registry = CommandRegistry::empty();
        registry.register("cmd", vec![recorder(&log, "old")]);
        registry.register("cmd", vec![recorder(&log, "new")]);

        let mut session = harness.session();
        registry.run(&mut session, &Command::new("cmd", vec![])).unwrap();

        assert_eq!(*log.borrow(), vec!["new"]);
    }

    #[test]
    fn test_steps_share_session() {
        let mut harness = Harness::new();
        let mut registry = CommandRegistry::empty();
        registry.register(
            "chain",
            vec![
                Box::new(|session: &mut Session<'_>, _: &Command| -> GatorResult<()> {
                    session.user = Some(User::new("writer".to_string()));
                    Ok(())
                }),
                Box::new(|session: &mut Session<'_>, _: &Command| -> GatorResult<()> {
                    assert_eq!(session.current_user()?.name, "writer");
                    Ok(())
                }),
            ],
        );

        let mut session = harness.session();
        registry.run(&mut session, &Command::new("chain", vec![])).unwrap();
    }

    #[test]
    fn test_default_table() {
        let registry = CommandRegistry::new();

        assert_eq!(
            registry.names(),
            vec![
                "addfeed", "agg", "browse", "feeds", "follow", "following", "login",
                "register", "reset", "unfollow", "users"
            ]
        );
    }

    #[test]
    fn test_follow_without_user_has_no_side_effects() {
        let mut harness = Harness::new();
        let owner = User::new("alice".to_string());
        harness.store.users.add(&owner).unwrap();
        let feed = crate::domain::Feed::new(
            "Example".to_string(),
            "https://example.com/feed".to_string(),
            owner.id,
        );
        harness.store.feeds.add(&feed).unwrap();

        let result = harness.run("follow", &["https://example.com/feed"]);
        assert!(matches!(result, Err(GatorError::UserResolution(_))));

        harness.config.current_user_name = Some("ghost".to_string());
        let result = harness.run("follow", &["https://example.com/feed"]);
        assert!(matches!(result, Err(GatorError::UserResolution(_))));

        assert!(harness.store.follows.get_for_user(owner.id).unwrap().is_empty());
    }

    #[test]
    fn test_expect_args() {
        let command = Command::new("login", vec!["alice".to_string()]);
        assert_eq!(command.expect_args(1, "<name>").unwrap(), ["alice".to_string()]);

        let err = command.expect_args(2, "<name> <url>").unwrap_err();
        assert_eq!(err.to_string(), "Invalid argument: usage: login <name> <url>");
    }
}
