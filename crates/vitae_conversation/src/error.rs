use crate::TurnId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown turn ID: {0}")]
    UnknownTurn(TurnId),

    #[error("a draft turn is already open")]
    DraftOpen,

    #[error("turns must alternate between user and assistant, starting with user")]
    RoleOrder,

    #[error("turn {0} is finalized and can no longer change")]
    Finalized(TurnId),
}

#[cfg(test)]
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        if std::mem::discriminant(self) != std::mem::discriminant(other) {
            return false;
        }

        // Good enough for testing purposes
        format!("{self:?}") == format!("{other:?}")
    }
}
