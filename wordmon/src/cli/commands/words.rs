//! `words` command handler.

use wordmon_core::{Catalog, Rarity, Word};

use crate::cli::args::{OutputFormat, WordsArgs};
use crate::config::{ConfigLoader, resolve_config_path};
use crate::error::WordmonError;

/// List the catalog a game would spawn from, with each word's reward.
///
/// # Errors
///
/// Returns a config error if the game file is invalid, or a JSON error if
/// serialization fails.
pub fn run(args: &WordsArgs) -> Result<(), WordmonError> {
    let path = resolve_config_path(args.config.clone());
    let loaded = ConfigLoader::with_defaults().load(path.as_deref())?;
    let catalog = loaded.config.catalog()?;
    let words = select(&catalog, args.rarity);

    match args.format {
        OutputFormat::Human => {
            for word in &words {
                println!(
                    "{:<10} {:<16} {:>4} xp  {}",
                    word.rarity.to_string(),
                    word.text,
                    word.points,
                    word.id
                );
            }
            println!("{} words", words.len());
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&words)?);
        }
    }
    Ok(())
}

/// Words of `catalog`, optionally limited to one tier, most frequent tier
/// first.
fn select(catalog: &Catalog, rarity: Option<Rarity>) -> Vec<&Word> {
    Rarity::ALL
        .into_iter()
        .filter(|r| rarity.is_none_or(|wanted| wanted == *r))
        .flat_map(|r| catalog.pool(r))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_every_tier_by_default() {
        let catalog = Catalog::default();
        let words = select(&catalog, None);
        assert_eq!(words.len(), catalog.len());
        assert_eq!(words[0].rarity, Rarity::Common);
    }

    #[test]
    fn filters_by_rarity() {
        let catalog = Catalog::default();
        let words = select(&catalog, Some(Rarity::Legendary));
        assert!(!words.is_empty());
        assert!(words.iter().all(|w| w.rarity == Rarity::Legendary));
    }
}
