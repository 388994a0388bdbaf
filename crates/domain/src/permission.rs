use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use gestor_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Closed catalog of screen-level permission keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionKey {
    /// Home dashboard and KPIs.
    Dashboard,
    /// Sales and point of sale.
    Vendas,
    /// Product catalog.
    Produtos,
    /// Stock levels and movements.
    Estoque,
    /// Customer registry.
    Clientes,
    /// Supplier registry.
    Fornecedores,
    /// Receivables, payables and cash flow.
    Financeiro,
    /// Reports and exports.
    Relatorios,
    /// Fiscal documents.
    NotasFiscais,
    /// Marketplace integrations.
    Marketplaces,
    /// Subscription and billing screens.
    Assinatura,
    /// Company user management.
    Usuarios,
    /// Company settings.
    Configuracoes,
    /// System administration console.
    AdminPanel,
}

impl PermissionKey {
    /// Returns a stable storage value for this key.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Vendas => "vendas",
            Self::Produtos => "produtos",
            Self::Estoque => "estoque",
            Self::Clientes => "clientes",
            Self::Fornecedores => "fornecedores",
            Self::Financeiro => "financeiro",
            Self::Relatorios => "relatorios",
            Self::NotasFiscais => "notas_fiscais",
            Self::Marketplaces => "marketplaces",
            Self::Assinatura => "assinatura",
            Self::Usuarios => "usuarios",
            Self::Configuracoes => "configuracoes",
            Self::AdminPanel => "admin_panel",
        }
    }

    /// Returns every key in the catalog.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[PermissionKey] = &[
            PermissionKey::Dashboard,
            PermissionKey::Vendas,
            PermissionKey::Produtos,
            PermissionKey::Estoque,
            PermissionKey::Clientes,
            PermissionKey::Fornecedores,
            PermissionKey::Financeiro,
            PermissionKey::Relatorios,
            PermissionKey::NotasFiscais,
            PermissionKey::Marketplaces,
            PermissionKey::Assinatura,
            PermissionKey::Usuarios,
            PermissionKey::Configuracoes,
            PermissionKey::AdminPanel,
        ];

        ALL
    }

    /// Parses a transport value into a permission key.
    pub fn from_transport(value: &str) -> AppResult<Self> {
        Self::from_str(value)
    }
}

impl FromStr for PermissionKey {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .find(|key| key.as_str() == value)
            .copied()
            .ok_or_else(|| AppError::Validation(format!("unknown permission key '{value}'")))
    }
}

impl Display for PermissionKey {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Problem found while decoding a stored permission map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionShapeIssue {
    /// The stored value is not a JSON object.
    NotAnObject {
        /// JSON type that was found instead.
        found: &'static str,
    },
    /// The key is not part of the catalog.
    UnknownKey {
        /// Raw stored key.
        key: String,
    },
    /// The key is known but its value is not a boolean.
    NonBoolean {
        /// Catalog key.
        key: PermissionKey,
        /// JSON type that was found instead.
        found: &'static str,
    },
}

impl Display for PermissionShapeIssue {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAnObject { found } => {
                write!(formatter, "permission map must be an object, got {found}")
            }
            Self::UnknownKey { key } => write!(formatter, "unknown permission key '{key}'"),
            Self::NonBoolean { key, found } => {
                write!(formatter, "permission '{key}' must be a boolean, got {found}")
            }
        }
    }
}

/// Per-key permission flags for one membership.
///
/// A key that is absent reads exactly like a key stored as `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionMap(BTreeMap<PermissionKey, bool>);

impl PermissionMap {
    /// Creates an empty map that denies every key.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes a stored JSON map, keeping every well-formed entry.
    ///
    /// Unknown keys and non-boolean values are reported and otherwise ignored,
    /// so the affected keys evaluate to `false`.
    #[must_use]
    pub fn from_stored(value: &Value) -> (Self, Vec<PermissionShapeIssue>) {
        let entries = match value {
            Value::Null => return (Self::new(), Vec::new()),
            Value::Object(entries) => entries,
            other => {
                return (
                    Self::new(),
                    vec![PermissionShapeIssue::NotAnObject {
                        found: json_type_name(other),
                    }],
                );
            }
        };

        let mut map = Self::new();
        let mut issues = Vec::new();
        for (raw_key, raw_value) in entries {
            let Ok(key) = PermissionKey::from_str(raw_key) else {
                issues.push(PermissionShapeIssue::UnknownKey {
                    key: raw_key.clone(),
                });
                continue;
            };

            match raw_value {
                Value::Bool(granted) => map.set(key, *granted),
                other => issues.push(PermissionShapeIssue::NonBoolean {
                    key,
                    found: json_type_name(other),
                }),
            }
        }

        (map, issues)
    }

    /// Sets one key.
    pub fn set(&mut self, key: PermissionKey, granted: bool) {
        self.0.insert(key, granted);
    }

    /// Returns a copy with the key set.
    #[must_use]
    pub fn with(mut self, key: PermissionKey, granted: bool) -> Self {
        self.set(key, granted);
        self
    }

    /// Returns whether the key is stored as exactly `true`.
    #[must_use]
    pub fn is_granted(&self, key: PermissionKey) -> bool {
        self.0.get(&key).copied().unwrap_or(false)
    }

    /// Returns the granted keys in catalog order.
    pub fn granted(&self) -> impl Iterator<Item = PermissionKey> + '_ {
        self.0
            .iter()
            .filter(|(_, granted)| **granted)
            .map(|(key, _)| *key)
    }

    /// Encodes the map for storage.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let entries = self
            .0
            .iter()
            .map(|(key, granted)| (key.as_str().to_owned(), Value::Bool(*granted)))
            .collect::<Map<String, Value>>();

        Value::Object(entries)
    }
}

impl FromIterator<PermissionKey> for PermissionMap {
    fn from_iter<T: IntoIterator<Item = PermissionKey>>(keys: T) -> Self {
        Self(keys.into_iter().map(|key| (key, true)).collect())
    }
}

/// Strictly validates a permission map submitted at an input boundary.
pub fn validate_permission_map(value: &Value) -> AppResult<PermissionMap> {
    let (map, issues) = PermissionMap::from_stored(value);
    if issues.is_empty() {
        return Ok(map);
    }

    let details = issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ");

    Err(AppError::Validation(format!(
        "invalid permission map: {details}"
    )))
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
