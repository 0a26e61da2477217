/*
 * Responsibility
 * - Generate prefixed synthetic ids ("item_…", "pinfo_…", "sinfo_…")
 * - The prefix tells the entity type apart from the id alone
 */
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdPrefix {
    Item,
    PurchaseInfo,
    SalesInfo,
}

impl IdPrefix {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Item => "item_",
            Self::PurchaseInfo => "pinfo_",
            Self::SalesInfo => "sinfo_",
        }
    }
}

/// New id: prefix + 32 lowercase hex chars.
pub fn generate(prefix: IdPrefix) -> String {
    format!("{}{}", prefix.as_str(), Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_carry_their_prefix() {
        let id = generate(IdPrefix::PurchaseInfo);
        let rest = id.strip_prefix("pinfo_").unwrap();

        assert_eq!(rest.len(), 32);
        assert!(rest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn ids_are_unique() {
        assert_ne!(generate(IdPrefix::Item), generate(IdPrefix::Item));
        assert!(generate(IdPrefix::SalesInfo).starts_with("sinfo_"));
    }
}
