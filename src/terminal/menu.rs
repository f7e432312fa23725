use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
pub enum Command {
    Exit = 0,
    CreateToken = 1,
    ConnectToken = 2,
    TokenDetails = 3,
    CheckBalance = 4,
    Mint = 5,
    Burn = 6,
    Transfer = 7,
    Approve = 8,
    TransferFrom = 9,
    CheckAllowance = 10,
    CreateAccount = 11,
    ImportAccount = 12,
    SwitchAccount = 13,
}

impl Command {
    /// Menu order; `Exit` is listed last.
    pub const MENU: [Command; 14] = [
        Command::CreateToken,
        Command::ConnectToken,
        Command::TokenDetails,
        Command::CheckBalance,
        Command::Mint,
        Command::Burn,
        Command::Transfer,
        Command::Approve,
        Command::TransferFrom,
        Command::CheckAllowance,
        Command::CreateAccount,
        Command::ImportAccount,
        Command::SwitchAccount,
        Command::Exit,
    ];

    pub fn number(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Command::Exit => "Exit",
            Command::CreateToken => "Create new token",
            Command::ConnectToken => "Connect to token",
            Command::TokenDetails => "Token details",
            Command::CheckBalance => "Check balance",
            Command::Mint => "Mint tokens",
            Command::Burn => "Burn tokens",
            Command::Transfer => "Transfer tokens",
            Command::Approve => "Approve spender",
            Command::TransferFrom => "Transfer from (allowance)",
            Command::CheckAllowance => "Check allowance",
            Command::CreateAccount => "Create new account",
            Command::ImportAccount => "Import account",
            Command::SwitchAccount => "Switch account",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuChoice {
    Command(Command),
    Unrecognized(String),
}

impl MenuChoice {
    pub fn parse(input: &str) -> Self {
        let input = input.trim();

        input
            .parse::<usize>()
            .ok()
            .and_then(Command::from_usize)
            .map_or_else(|| MenuChoice::Unrecognized(input.to_owned()), MenuChoice::Command)
    }
}
