//! Dispatch loop.
//!
//! ```text
//! ParsingGlobals -> Resolving -> Invoking -> Reporting
//! ```
//!
//! Version and usage requests finish before the configuration is loaded;
//! `--list-commands` finishes once the registry is built.

use std::io::{self, Write};
use std::sync::Arc;

use hostadm_commands::help::{self, HelpAssembler};
use hostadm_commands::{
    AppInfo, CommandContext, CommandRegistry, ExitOutcome, builtin, resolver,
};
use hostadm_common::{HostConfig, Variables};
use hostadm_script::ScriptBridge;

use super::args::{GlobalArgs, Invocation, VERSION};
use crate::logging;

/// Name of the command run when none is given.
const DEFAULT_COMMAND: &str = "help";

/// Script runtime and registry for one invocation.
struct Session {
    bridge: ScriptBridge,
    registry: Arc<CommandRegistry>,
}

enum Stage {
    ParsingGlobals(Vec<String>),
    Resolving {
        session: Session,
        program: String,
        command: Option<String>,
        rest: Vec<String>,
    },
    Invoking {
        session: Session,
        command: String,
        args: Vec<String>,
    },
    Reporting(ExitOutcome),
}

/// Runs exactly one command per process.
pub struct Dispatcher {
    app: AppInfo,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(AppInfo::new("hostadm", "Hostadm", VERSION))
    }
}

impl Dispatcher {
    pub fn new(app: AppInfo) -> Self {
        Self { app }
    }

    /// Drive `argv` through every stage and return the final outcome.
    pub async fn run(&self, argv: Vec<String>) -> ExitOutcome {
        let mut stage = Stage::ParsingGlobals(argv);
        loop {
            stage = match stage {
                Stage::ParsingGlobals(argv) => self.parse_globals(argv).await,
                Stage::Resolving {
                    session,
                    program,
                    command,
                    rest,
                } => self.resolve(session, program, command, rest),
                Stage::Invoking {
                    session,
                    command,
                    args,
                } => self.invoke(session, &command, args).await,
                Stage::Reporting(outcome) => {
                    tracing::debug!("Exiting with status {}", outcome.code());
                    return outcome;
                }
            };
        }
    }

    async fn parse_globals(&self, argv: Vec<String>) -> Stage {
        let invocation = match Invocation::parse(&argv) {
            Ok(invocation) => invocation,
            Err(e) => {
                eprintln!("option parsing failed: {e}");
                return Stage::Reporting(ExitOutcome::Failure);
            }
        };

        logging::init(invocation.globals.verbose);

        if invocation.globals.version {
            println!("{} {}", self.app.display_name, self.app.version);
            return Stage::Reporting(ExitOutcome::Success);
        }
        if invocation.globals.help {
            print!("{}", GlobalArgs::usage());
            return Stage::Reporting(ExitOutcome::Success);
        }

        let Invocation {
            program,
            globals,
            vars,
            command,
            rest,
        } = invocation;

        let session = match self.open_session(vars).await {
            Ok(session) => session,
            Err(e) => {
                eprintln!("{e:#}");
                return Stage::Reporting(ExitOutcome::Failure);
            }
        };

        if globals.list_commands {
            return Stage::Reporting(self.list_commands(&session).await);
        }

        Stage::Resolving {
            session,
            program,
            command,
            rest,
        }
    }

    fn resolve(
        &self,
        session: Session,
        program: String,
        command: Option<String>,
        rest: Vec<String>,
    ) -> Stage {
        let name = command.unwrap_or_else(|| DEFAULT_COMMAND.to_string());

        if let Err(not_found) = session.registry.resolve(&name) {
            if let Err(e) = resolver::report_not_found(&not_found, &session.registry, &mut io::stderr()) {
                tracing::warn!("Cannot print suggestions: {e}");
            }
            return Stage::Reporting(ExitOutcome::Failure);
        }

        let mut args = Vec::with_capacity(rest.len() + 1);
        args.push(format!("{program} {name}"));
        args.extend(rest);

        Stage::Invoking {
            session,
            command: name,
            args,
        }
    }

    async fn invoke(&self, session: Session, command: &str, args: Vec<String>) -> Stage {
        let Ok(cmd) = session.registry.resolve(command) else {
            return Stage::Reporting(ExitOutcome::Failure);
        };

        let ctx = CommandContext {
            app: &self.app,
            config: session.bridge.config(),
            host: &session.bridge,
        };

        tracing::debug!("Running command {} with {} argument(s)", cmd.name(), args.len() - 1);
        let outcome = match cmd.run(&args, &ctx).await {
            Ok(outcome) => outcome,
            Err(e) => {
                eprintln!("{e:#}");
                ExitOutcome::Failure
            }
        };

        let stats = session.bridge.pool().stats();
        tracing::debug!(
            "Script runtimes: {} created, {} acquired, {} released",
            stats.created,
            stats.acquired,
            stats.released
        );

        Stage::Reporting(outcome)
    }

    /// Load the configuration, start the script runtime and build the
    /// registry.
    async fn open_session(&self, vars: Variables) -> anyhow::Result<Session> {
        let config = match HostConfig::load(vars.clone()) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!("{e}");
                HostConfig::from_document(Default::default(), vars)
            }
        };

        let bridge = ScriptBridge::new(config, self.app.version.clone());
        let discovered = bridge.discover_commands().await;
        let registry = CommandRegistry::build(builtin::native_commands(), discovered)?;

        Ok(Session { bridge, registry })
    }

    async fn list_commands(&self, session: &Session) -> ExitOutcome {
        let mut out = io::stdout();
        let assembler = HelpAssembler::new(&session.registry, &session.bridge);

        let written = match help::write_banner(&self.app, &mut out) {
            Ok(()) => assembler.listing(&mut out).await,
            Err(e) => Err(e),
        };

        match written.and_then(|()| out.flush()) {
            Ok(()) => ExitOutcome::Success,
            Err(e) => {
                eprintln!("{e}");
                ExitOutcome::Failure
            }
        }
    }
}

/// Run `hostadm` with `argv` and return the process outcome.
pub async fn run(argv: Vec<String>) -> ExitOutcome {
    Dispatcher::default().run(argv).await
}
