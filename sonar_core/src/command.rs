/// Operator commands, one byte each
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    Start,
    Stop,
}

pub const BANNER: &str = "Digite 'S' para iniciar as leituras e 'P' para parar.";

impl Command {
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            b'S' => Some(Command::Start),
            b'P' => Some(Command::Stop),
            _ => None,
        }
    }

    pub fn ack(&self) -> &'static str {
        match self {
            Command::Start => "Iniciando...",
            Command::Stop => "Parando...",
        }
    }
}
