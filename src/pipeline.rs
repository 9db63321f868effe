use std::fmt;

/// One program in a pipeline together with its arguments. Arguments are
/// passed to the program verbatim, never through a shell.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandStage {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandStage {
    pub fn new(program: &str) -> CommandStage {
        CommandStage {
            program: program.to_string(),
            args: vec![],
        }
    }

    pub fn arg<S: ToString>(mut self, arg: S) -> CommandStage {
        self.args.push(arg.to_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> CommandStage
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        for a in args {
            self.args.push(a.to_string());
        }
        self
    }

    pub fn shell_words(&self) -> String {
        let mut words = vec![shell_quote(&self.program)];
        words.extend(self.args.iter().map(|a| shell_quote(a)));
        words.join(" ")
    }
}

impl fmt::Display for CommandStage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.shell_words())
    }
}

/// Stages whose stdout feeds the next stage's stdin, in order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Pipeline {
    pub stages: Vec<CommandStage>,
}

impl Pipeline {
    pub fn new() -> Pipeline {
        Pipeline { stages: vec![] }
    }

    pub fn pipe(mut self, stage: CommandStage) -> Pipeline {
        self.stages.push(stage);
        self
    }

    /// Equivalent bash command line, for display. Every word that could be
    /// interpreted by the shell is single quoted.
    pub fn shell_command(&self) -> String {
        format!(
            "set -e -o pipefail; {}",
            self.stages
                .iter()
                .map(|s| s.shell_words())
                .collect::<Vec<_>>()
                .join(" | ")
        )
    }
}

fn is_shell_safe(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || match c {
            '-' | '_' | '.' | '/' | ':' | ',' | '=' | '+' | '@' | '%' => true,
            _ => false,
        }
}

/// Quote a word so that bash passes it through unchanged.
pub fn shell_quote(word: &str) -> String {
    if !word.is_empty() && word.chars().all(is_shell_safe) {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', "'\\''"))
    }
}
