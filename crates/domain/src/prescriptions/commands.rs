use serde::{Deserialize, Serialize};

use crate::errors::Error;
use crate::pharmacies::Pharmacy;

use super::{Role, Transition};

#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub enum Command {
    /// Route a CREATED prescription to a pharmacy
    Dispatch { pharmacy: Pharmacy, role: Role },

    /// Move a dispatched prescription to its next status
    Advance { role: Role },
}

impl Command {
    pub fn transition(&self) -> Transition {
        match self {
            Command::Dispatch { .. } => Transition::Dispatch,
            Command::Advance { .. } => Transition::Advance,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Command::Dispatch { role, .. } | Command::Advance { role } => *role,
        }
    }

    /// Local role check, runs before anything reaches the network.
    pub fn authorize(&self) -> Result<(), Error> {
        self.transition().authorize(self.role())
    }
}
