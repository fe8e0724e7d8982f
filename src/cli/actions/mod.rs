pub mod session;
pub mod status;

use secrecy::SecretString;

#[derive(Debug)]
pub enum Action {
    Register { email: String, password: SecretString },
    Login { email: String, password: SecretString },
    Refresh,
    Logout,
    Status,
}
