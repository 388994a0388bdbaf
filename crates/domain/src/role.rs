use std::fmt::{Display, Formatter};
use std::str::FromStr;

use gestor_core::AppError;
use serde::{Deserialize, Serialize};

use crate::{PermissionKey, PermissionMap};

/// Role carried by a company membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Platform operator with unrestricted access.
    SuperAdmin,
    /// Company administrator who contracted the service.
    Contratante,
    /// Operational user scoped to departments.
    Operador,
}

impl Role {
    /// Returns a stable storage value for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "super_admin",
            Self::Contratante => "contratante",
            Self::Operador => "operador",
        }
    }

    /// Returns the label shown in access messages.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "Super Admin",
            Self::Contratante => "Contratante",
            Self::Operador => "Operador",
        }
    }

    /// Returns all known roles.
    #[must_use]
    pub fn all() -> &'static [Self] {
        &[Self::SuperAdmin, Self::Contratante, Self::Operador]
    }

    /// Returns the permission set granted to new members with this role.
    #[must_use]
    pub fn default_permissions(&self) -> PermissionMap {
        match self {
            Self::SuperAdmin => PermissionKey::all().iter().copied().collect(),
            Self::Contratante => PermissionKey::all()
                .iter()
                .copied()
                .filter(|key| *key != PermissionKey::AdminPanel)
                .collect(),
            Self::Operador => [
                PermissionKey::Dashboard,
                PermissionKey::Vendas,
                PermissionKey::Produtos,
                PermissionKey::Clientes,
            ]
            .into_iter()
            .collect(),
        }
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "super_admin" => Ok(Self::SuperAdmin),
            "contratante" => Ok(Self::Contratante),
            "operador" => Ok(Self::Operador),
            _ => Err(AppError::Validation(format!("unknown role '{value}'"))),
        }
    }
}

impl Display for Role {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}
