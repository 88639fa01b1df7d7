#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    History,
    Clear,
    Undo,
    Redo,
    Save,
    Load,
    Exit,
    Empty,
    Calculate { op: String, a: String, b: String },
    Invalid(String),
}

impl Command {
    pub fn parse(input: &str) -> Self {
        let parts: Vec<&str> = input.split_whitespace().collect();

        match parts.as_slice() {
            [] => Command::Empty,
            [word] => match word.to_lowercase().as_str() {
                "help" | "?" => Command::Help,
                "history" => Command::History,
                "clear" => Command::Clear,
                "undo" => Command::Undo,
                "redo" => Command::Redo,
                "save" => Command::Save,
                "load" => Command::Load,
                "exit" | "quit" => Command::Exit,
                _ => Command::Invalid(input.trim().to_string()),
            },
            [op, a, b] => Command::Calculate {
                op: op.to_lowercase(),
                a: a.to_string(),
                b: b.to_string(),
            },
            _ => Command::Invalid(input.trim().to_string()),
        }
    }
}
