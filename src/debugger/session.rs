use super::context::{describe_slot, ContextBroker};
use super::state::DebuggerState;
use crate::host::Console;
use std::cell::{Cell, RefCell};
use std::io::{self, BufRead, Write};
use std::rc::{Rc, Weak};
use tracing::warn;

const PROMPT: &str = "> ";

/// Line-driven console: reads commands from `input`, answers on `output`.
///
/// Commands: `self`, `locals`, `break <spec>`, `list`, `continue` (or `c`,
/// `exit`). End of input also ends the session.
pub struct LineConsole<R, W> {
    input: RefCell<R>,
    output: RefCell<W>,
    enabled: Cell<bool>,
    state: RefCell<Weak<DebuggerState>>,
}

impl LineConsole<io::StdinLock<'static>, io::Stderr> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> LineConsole<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input: RefCell::new(input),
            output: RefCell::new(output),
            enabled: Cell::new(false),
            state: RefCell::new(Weak::new()),
        }
    }

    /// Give the console access to the registry for `break` and `list`.
    pub fn attach(&self, state: &Rc<DebuggerState>) {
        *self.state.borrow_mut() = Rc::downgrade(state);
    }

    pub fn into_output(self) -> W {
        self.output.into_inner()
    }

    fn read_command(&self) -> io::Result<Option<Vec<String>>> {
        {
            let mut out = self.output.borrow_mut();
            write!(out, "{}", PROMPT)?;
            out.flush()?;
        }

        let mut line = String::new();
        if self.input.borrow_mut().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        match shlex::split(line.trim()) {
            Some(words) => Ok(Some(words)),
            None => {
                writeln!(self.output.borrow_mut(), "unbalanced quotes")?;
                Ok(Some(Vec::new()))
            }
        }
    }

    /// Handle one command. Returns false once the session should end.
    fn run_command(&self, broker: &ContextBroker, words: &[String]) -> io::Result<bool> {
        let Some((cmd, args)) = words.split_first() else {
            return Ok(true);
        };
        let mut out = self.output.borrow_mut();

        match cmd.as_str() {
            "c" | "continue" | "exit" => return Ok(false),
            "self" => {
                writeln!(out, "{}", describe_slot(broker.current().as_ref()))?;
            }
            "locals" => match broker.current() {
                Some(ctx) if !ctx.binding.locals.is_empty() => {
                    for (name, value) in &ctx.binding.locals {
                        writeln!(out, "  {}={}", name, value)?;
                    }
                }
                _ => writeln!(out, "  <no locals>")?,
            },
            "break" | "b" => {
                let Some(spec) = args.first() else {
                    writeln!(out, "usage: break <Owner#method | Owner.method>")?;
                    return Ok(true);
                };
                let Some(state) = self.state.borrow().upgrade() else {
                    writeln!(out, "console is not attached to a tracer")?;
                    return Ok(true);
                };
                // the lookup may reach traced code and a nested session
                drop(out);
                let reply = match state.add_breakpoint(spec) {
                    Ok(bp) => format!("breakpoint set at line {}", bp.line),
                    Err(e) => e.to_string(),
                };
                writeln!(self.output.borrow_mut(), "{}", reply)?;
            }
            "list" | "l" => match self.state.borrow().upgrade() {
                Some(state) => {
                    let registry = state.registry();
                    for (owner, line) in registry.entries() {
                        let name = state.namespace().name_of(owner).unwrap_or("?");
                        writeln!(out, "  {}:{}", name, line)?;
                    }
                    for spec in registry.pending() {
                        writeln!(out, "  {} (pending)", spec)?;
                    }
                }
                None => writeln!(out, "console is not attached to a tracer")?,
            },
            other => {
                writeln!(out, "Unknown command: {}", other)?;
            }
        }
        Ok(true)
    }

    fn session(&self, broker: &ContextBroker) -> io::Result<()> {
        writeln!(
            self.output.borrow_mut(),
            "Commands: self, locals, (b)reak <spec>, (l)ist, (c)ontinue"
        )?;
        while let Some(words) = self.read_command()? {
            if !self.run_command(broker, &words)? {
                break;
            }
        }
        Ok(())
    }
}

impl<R: BufRead, W: Write> Console for LineConsole<R, W> {
    fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    fn set_enabled(&self, enabled: bool) {
        self.enabled.set(enabled);
    }

    fn open(&self, broker: &ContextBroker) {
        if let Err(e) = self.session(broker) {
            warn!(error = %e, "console session ended with an I/O error");
        }
    }
}
