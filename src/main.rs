//zagent/src/main.rs
use std::io::{self, BufRead, Write};
use std::path::Path;

use zagent::kernel::chat::MessageKind;
use zagent::kernel::services::adapters::{self, GeminiClient, ProcessBridge};
use zagent::kernel::services::ports::ChatClient;
use zagent::kernel::{
    demo_tasks, find_demo, AgentRole, LineKind, OrchestrationMode, RuntimeStatus, Session,
    SingleAgentKind,
};
use zagent::models::{FileTree, NodeId, NodeKind};

mod logging;

const HELP: &str = "\
Terminal commands:
  python <file>            run a file from the workspace
  ls                       list the workspace root
  clear                    clear the terminal
Session commands:
  :tree                    show the workspace
  :open <path|name>        select a file or folder
  :cat                     print the open file
  :new file|folder <name>  create next to the selection
  :edit                    replace the open file; end input with a single '.'
  :import <dir>            merge a local directory into the workspace
  :demo [task] [single|multi]
                           list or load an evaluation task
  :mode single|multi [react|langchain]
  :ask <prompt>            ask the agent
  :apply / :discard        accept or drop the pending suggestion
  :agents                  show agent status and tool log
  :status                  show runtime state, mode and last error
  :quit";

struct Cli {
    runtime: tokio::runtime::Runtime,
    session: Session<ProcessBridge>,
    chat: Option<GeminiClient>,
    printed_line: Option<u64>,
    printed_message: Option<u64>,
}

impl Cli {
    fn chat_client(&self) -> Option<&dyn ChatClient> {
        self.chat.as_ref().map(|c| c as &dyn ChatClient)
    }

    fn print_new(&mut self) {
        let transcript = self.session.transcript();
        for line in transcript.since(self.printed_line) {
            match line.kind {
                LineKind::Input => println!("$ {}", line.content),
                LineKind::Output => println!("{}", line.content),
                LineKind::Error => println!("! {}", line.content),
                LineKind::Info => println!("# {}", line.content),
            }
        }
        if let Some(id) = transcript.last_id() {
            self.printed_line = Some(id);
        }

        let chat = self.session.chat();
        for message in chat.since(self.printed_message) {
            match message.kind {
                MessageKind::User => println!("[you] {}", message.content),
                MessageKind::System => println!("[system] {}", message.content),
                MessageKind::Agent => {
                    let role = message.role.unwrap_or(AgentRole::Orchestrator);
                    println!("[{}] {}", role.label(), message.content);
                }
            }
        }
        self.printed_message = chat.last_id();

        if let Some(pending) = self.session.pending_suggestion() {
            println!("{}", pending.prompt());
            println!("{}", pending.code);
            println!("(:apply to accept, :discard to drop)");
        }
    }

    /// Returns `false` when the user asked to quit.
    fn handle(&mut self, line: &str, input: &mut impl BufRead) -> bool {
        let line = line.trim();
        if line.is_empty() {
            return true;
        }
        let Some(command) = line.strip_prefix(':') else {
            self.runtime.block_on(self.session.submit(line));
            return true;
        };

        let (name, rest) = command
            .split_once(char::is_whitespace)
            .map(|(n, r)| (n, r.trim()))
            .unwrap_or((command, ""));

        match name {
            "help" => println!("{HELP}"),
            "quit" | "q" => return false,
            "tree" => print_tree(self.session.tree()),
            "open" => self.open(rest),
            "cat" => match self.session.active_file() {
                Some(id) => println!("{}", self.session.tree().content(id).unwrap_or_default()),
                None => println!("no file is open"),
            },
            "new" => self.create(rest),
            "edit" => self.edit(input),
            "import" => self.import(Path::new(rest)),
            "demo" => self.demo(rest),
            "mode" => self.mode(rest),
            "ask" => {
                if rest.is_empty() {
                    println!("usage: :ask <prompt>");
                } else {
                    let client = self.chat.as_ref().map(|c| c as &dyn ChatClient);
                    self.runtime.block_on(self.session.ask(client, rest));
                }
            }
            "apply" => match self.session.confirm_suggestion() {
                Ok(name) => tracing::info!(file = %name, "suggestion applied"),
                Err(e) => println!("{e}"),
            },
            "discard" => {
                if !self.session.discard_suggestion() {
                    println!("no suggestion is waiting");
                }
            }
            "agents" => self.print_agents(),
            "status" => self.print_status(),
            other => println!("unknown session command :{other} (try :help)"),
        }
        true
    }

    fn open(&mut self, target: &str) {
        let tree = self.session.tree();
        let found = tree
            .find_by_path(target)
            .filter(|_| !target.is_empty())
            .or_else(|| tree.find_by_name(target));
        match found {
            Some(id) => {
                let path = tree.path_of(id).unwrap_or_default();
                self.session.select(id);
                println!("opened /{path}");
            }
            None => println!("'{target}' not found"),
        }
    }

    fn create(&mut self, args: &str) {
        let (kind, name) = match args.split_once(char::is_whitespace) {
            Some(("file", name)) => (NodeKind::File, name.trim()),
            Some(("folder", name)) => (NodeKind::Folder, name.trim()),
            _ => {
                println!("usage: :new file|folder <name>");
                return;
            }
        };
        if let Err(e) = self.session.create_entry(kind, name) {
            println!("{e}");
        }
    }

    fn edit(&mut self, input: &mut impl BufRead) {
        if self.session.active_file().is_none() {
            println!("no file is open");
            return;
        }
        let mut content = String::new();
        for line in input.lines() {
            let Ok(line) = line else {
                break;
            };
            if line == "." {
                break;
            }
            content.push_str(&line);
            content.push('\n');
        }
        if let Err(e) = self.session.edit_active(content) {
            println!("{e}");
        }
    }

    fn import(&mut self, dir: &Path) {
        match adapters::read_directory(dir) {
            Ok(files) => {
                self.session.import(files);
            }
            Err(e) => println!("import failed: {e}"),
        }
    }

    fn demo(&mut self, args: &str) {
        let mut parts = args.split_whitespace();
        let Some(id) = parts.next() else {
            for task in demo_tasks() {
                println!(
                    "{}  [{}] {}: {}",
                    task.id,
                    task.difficulty.label(),
                    task.title,
                    task.description
                );
            }
            return;
        };
        let Some(task) = find_demo(id) else {
            println!("unknown task '{id}'");
            return;
        };
        let mode = parts
            .next()
            .and_then(OrchestrationMode::parse)
            .unwrap_or(self.session.mode());

        let prompt = self.runtime.block_on(self.session.load_demo(&task, mode));
        self.print_new();
        let client = self.chat.as_ref().map(|c| c as &dyn ChatClient);
        self.runtime.block_on(self.session.ask(client, prompt));
    }

    fn mode(&mut self, args: &str) {
        let mut parts = args.split_whitespace();
        match parts.next().and_then(OrchestrationMode::parse) {
            Some(mode) => self.session.set_mode(mode),
            None => {
                println!("usage: :mode single|multi [react|langchain]");
                return;
            }
        }
        if let Some(kind) = parts.next().and_then(SingleAgentKind::parse) {
            self.session.set_single_agent(kind);
        }
        println!(
            "mode: {} ({})",
            self.session.mode().label(),
            self.session.single_agent().label()
        );
    }

    fn print_status(&self) {
        let runtime = match self.session.runtime_status() {
            RuntimeStatus::Loading => "loading".to_string(),
            RuntimeStatus::Ready => "ready".to_string(),
            RuntimeStatus::Failed(reason) => format!("failed: {reason}"),
        };
        println!("runtime: {runtime}");
        println!(
            "mode: {} ({})",
            self.session.mode().label(),
            self.session.single_agent().label()
        );
        if let Some(error) = self.session.last_error() {
            println!("last error:\n{error}");
        }
    }

    fn print_agents(&self) {
        let agents = self.session.agents();
        for status in agents.statuses() {
            let state = if status.is_active { "active" } else { "idle" };
            println!("{:<13} {state:<6} {}", status.role.label(), status.current_action);
        }
        for log in agents.tool_logs() {
            println!("  {} [{}] {}", log.tool_name, log.status.label(), log.args);
        }
    }
}

fn print_tree(tree: &FileTree) {
    fn walk(tree: &FileTree, id: NodeId, depth: usize, selected: Option<NodeId>) {
        for entry in tree.list_children(id) {
            let marker = if Some(entry.id) == selected { "*" } else { " " };
            let indent = "  ".repeat(depth);
            match entry.kind {
                NodeKind::Folder => {
                    println!("{marker} {indent}{}/", entry.name);
                    walk(tree, entry.id, depth + 1, selected);
                }
                NodeKind::File => {
                    let runnable = tree.language(entry.id).is_some_and(|l| l.is_runnable());
                    let tag = if runnable { "  [run]" } else { "" };
                    println!("{marker} {indent}{}{tag}", entry.name);
                }
            }
        }
    }

    let root = tree.root();
    println!(
        "  {}/  ({} nodes)",
        tree.name(root).unwrap_or_default(),
        tree.node_count()
    );
    walk(tree, root, 1, tree.selected());
}

fn main() -> io::Result<()> {
    let logging_guard = logging::init();
    if let Some(guard) = &logging_guard {
        println!("# logs: {}", guard.log_dir().display());
    }

    if let Err(e) = adapters::ensure_settings_file() {
        tracing::warn!(error = %e, "settings file unavailable");
    }
    let settings = adapters::load_settings().unwrap_or_default();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let scratch = adapters::ensure_scratch_dir(settings.runtime.scratch_dir.as_deref())?;
    let bridge = ProcessBridge::new(&settings.runtime, scratch);

    let chat = match GeminiClient::from_settings(&settings.chat) {
        Ok(client) => Some(client),
        Err(e) => {
            tracing::info!(error = %e, "chat client disabled");
            None
        }
    };

    let mut cli = Cli {
        runtime,
        session: Session::new(bridge, &settings),
        chat,
        printed_line: None,
        printed_message: None,
    };
    if cli.chat_client().is_none() {
        println!(
            "# {} is not set; :ask will only ask for a key.",
            settings.chat.api_key_env
        );
    }

    cli.print_new();
    cli.runtime.block_on(cli.session.boot());
    if let Some(dir) = std::env::args_os().nth(1) {
        cli.import(Path::new(&dir));
    }
    cli.print_new();

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut line = String::new();
    loop {
        print!("zagent> ");
        io::stdout().flush()?;
        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let command = line.clone();
        if !cli.handle(&command, &mut input) {
            break;
        }
        cli.print_new();
    }

    tracing::info!("session closed");
    Ok(())
}
