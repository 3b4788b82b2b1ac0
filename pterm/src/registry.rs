use pterm_types::{CommandDescriptor, CommandSummary, RegistryError};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Name and aliases of a command, as exposed to autocomplete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandNames {
    pub name: String,
    pub aliases: Vec<String>,
}

/// Table of registered commands.
///
/// Commands are registered once at startup. The controller keeps the
/// registry behind an `Arc`, so it is read-only for the lifetime of a
/// session.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: Vec<Arc<CommandDescriptor>>,
    /// lowercase name -> index into `commands`
    names: HashMap<String, usize>,
    /// lowercase alias -> index into `commands`
    aliases: HashMap<String, usize>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command. Names and aliases are unique across the whole
    /// registry, compared case-insensitively.
    pub fn register(&mut self, descriptor: CommandDescriptor) -> Result<(), RegistryError> {
        validate_name(&descriptor.name)?;
        for alias in &descriptor.aliases {
            validate_name(alias)?;
        }

        let name_key = descriptor.name.to_lowercase();
        if let Some(existing) = self.owner_of(&name_key) {
            return Err(RegistryError::DuplicateCommand {
                name: descriptor.name.clone(),
                existing: existing.to_string(),
            });
        }

        let mut alias_keys: Vec<String> = Vec::with_capacity(descriptor.aliases.len());
        for alias in &descriptor.aliases {
            let key = alias.to_lowercase();
            let existing = if key == name_key || alias_keys.contains(&key) {
                Some(descriptor.name.as_str())
            } else {
                self.owner_of(&key)
            };
            if let Some(existing) = existing {
                return Err(RegistryError::DuplicateCommand {
                    name: alias.clone(),
                    existing: existing.to_string(),
                });
            }
            alias_keys.push(key);
        }

        let index = self.commands.len();
        debug!(
            "register command: {} aliases: {:?}",
            descriptor.name, descriptor.aliases
        );
        self.names.insert(name_key, index);
        for key in alias_keys {
            self.aliases.insert(key, index);
        }
        self.commands.push(Arc::new(descriptor));
        Ok(())
    }

    /// Case-insensitive exact match against names first, then aliases.
    pub fn resolve(&self, token: &str) -> Option<Arc<CommandDescriptor>> {
        let key = token.to_lowercase();
        self.names
            .get(&key)
            .or_else(|| self.aliases.get(&key))
            .and_then(|index| self.commands.get(*index))
            .cloned()
    }

    pub fn list_for_autocomplete(&self) -> Vec<CommandNames> {
        self.commands
            .iter()
            .map(|c| CommandNames {
                name: c.name.clone(),
                aliases: c.aliases.clone(),
            })
            .collect()
    }

    /// Summaries in registration order.
    pub fn catalog(&self) -> Vec<CommandSummary> {
        self.commands.iter().map(|c| c.summary()).collect()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    fn owner_of(&self, key: &str) -> Option<&str> {
        self.names
            .get(key)
            .or_else(|| self.aliases.get(key))
            .and_then(|index| self.commands.get(*index))
            .map(|c| c.name.as_str())
    }
}

fn validate_name(name: &str) -> Result<(), RegistryError> {
    if name.is_empty() || name.chars().any(|c| c.is_whitespace() || c == '"') {
        return Err(RegistryError::InvalidName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pterm_types::{CommandOutput, FnHandler};

    fn command(name: &str, aliases: &[&str]) -> CommandDescriptor {
        let mut descriptor = CommandDescriptor::new(
            name,
            format!("{name} help"),
            FnHandler::new(|_, _| Ok(CommandOutput::empty())),
        );
        for alias in aliases {
            descriptor = descriptor.alias(*alias);
        }
        descriptor
    }

    #[test]
    fn test_resolve_by_name_and_alias() {
        let mut registry = CommandRegistry::new();
        registry.register(command("clear", &["cls"])).unwrap();
        registry.register(command("help", &["?"])).unwrap();

        assert_eq!(registry.resolve("clear").unwrap().name, "clear");
        assert_eq!(registry.resolve("CLEAR").unwrap().name, "clear");
        assert_eq!(registry.resolve("Cls").unwrap().name, "clear");
        assert_eq!(registry.resolve("?").unwrap().name, "help");
        assert!(registry.resolve("foobar").is_none());
        assert!(registry.resolve("").is_none());
    }

    #[test]
    fn test_duplicate_name_is_rejected() {
        let mut registry = CommandRegistry::new();
        registry.register(command("help", &[])).unwrap();
        let err = registry.register(command("HELP", &[])).unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicateCommand {
                name: "HELP".to_string(),
                existing: "help".to_string(),
            }
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_alias_colliding_with_name_is_rejected() {
        let mut registry = CommandRegistry::new();
        registry.register(command("ls", &[])).unwrap();
        let err = registry.register(command("projects", &["LS"])).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::DuplicateCommand { existing, .. } if existing == "ls"
        ));
        // nothing from the failed registration leaks in
        assert!(registry.resolve("projects").is_none());
    }

    #[test]
    fn test_name_colliding_with_alias_is_rejected() {
        let mut registry = CommandRegistry::new();
        registry.register(command("clear", &["cls"])).unwrap();
        assert!(registry.register(command("cls", &[])).is_err());
    }

    #[test]
    fn test_self_collisions_are_rejected() {
        let mut registry = CommandRegistry::new();
        assert!(registry.register(command("open", &["OPEN"])).is_err());
        assert!(registry.register(command("open", &["cd", "CD"])).is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_invalid_names() {
        let mut registry = CommandRegistry::new();
        assert_eq!(
            registry.register(command("", &[])),
            Err(RegistryError::InvalidName(String::new()))
        );
        assert!(registry.register(command("two words", &[])).is_err());
        assert!(registry.register(command("ok", &["bad alias"])).is_err());
    }

    #[test]
    fn test_list_for_autocomplete_keeps_registration_order() {
        let mut registry = CommandRegistry::new();
        registry.register(command("whoami", &[])).unwrap();
        registry.register(command("clear", &["cls"])).unwrap();
        let names = registry.list_for_autocomplete();
        assert_eq!(
            names,
            vec![
                CommandNames {
                    name: "whoami".to_string(),
                    aliases: vec![],
                },
                CommandNames {
                    name: "clear".to_string(),
                    aliases: vec!["cls".to_string()],
                },
            ]
        );
        assert_eq!(registry.catalog()[1].usage, "usage: clear");
    }
}
