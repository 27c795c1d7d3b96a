//! Built-in English nickname table, appended to a fresh alias log as
//! `seeded` aliases.

use crate::log::AliasEvent;
use crate::store::NicknameStore;

/// `(canonical first name, nickname)` pairs.
pub const SEED_ALIASES: &[(&str, &str)] = &[
    ("Abigail", "Abby"),
    ("Alexander", "Alex"),
    ("Alexandra", "Alex"),
    ("Alexandra", "Lexi"),
    ("Andrew", "Andy"),
    ("Andrew", "Drew"),
    ("Anthony", "Tony"),
    ("Benjamin", "Ben"),
    ("Catherine", "Cathy"),
    ("Christina", "Tina"),
    ("Christopher", "Chris"),
    ("Daniel", "Dan"),
    ("Daniel", "Danny"),
    ("Deborah", "Deb"),
    ("Edward", "Ed"),
    ("Edward", "Eddie"),
    ("Edward", "Ted"),
    ("Elizabeth", "Beth"),
    ("Elizabeth", "Betty"),
    ("Elizabeth", "Liz"),
    ("Elizabeth", "Lizzie"),
    ("Gregory", "Greg"),
    ("Isabella", "Bella"),
    ("Isabella", "Izzy"),
    ("James", "Jamie"),
    ("James", "Jim"),
    ("James", "Jimmy"),
    ("Jennifer", "Jen"),
    ("Jennifer", "Jenny"),
    ("Jessica", "Jess"),
    ("John", "Jack"),
    ("John", "Johnny"),
    ("Jonathan", "Jon"),
    ("Joseph", "Joe"),
    ("Joseph", "Joey"),
    ("Joshua", "Josh"),
    ("Katherine", "Kate"),
    ("Katherine", "Kathy"),
    ("Katherine", "Katie"),
    ("Kimberly", "Kim"),
    ("Madeline", "Maddie"),
    ("Margaret", "Maggie"),
    ("Margaret", "Meg"),
    ("Margaret", "Peggy"),
    ("Matthew", "Matt"),
    ("Michael", "Mike"),
    ("Michael", "Mikey"),
    ("Nathaniel", "Nate"),
    ("Nicholas", "Nick"),
    ("Olivia", "Liv"),
    ("Patricia", "Pat"),
    ("Patricia", "Patty"),
    ("Patricia", "Trish"),
    ("Rebecca", "Becca"),
    ("Rebecca", "Becky"),
    ("Richard", "Rich"),
    ("Richard", "Rick"),
    ("Robert", "Bob"),
    ("Robert", "Bobby"),
    ("Robert", "Rob"),
    ("Robert", "Robbie"),
    ("Samantha", "Sam"),
    ("Samuel", "Sam"),
    ("Stephanie", "Steph"),
    ("Steven", "Steve"),
    ("Susan", "Sue"),
    ("Thomas", "Tom"),
    ("Thomas", "Tommy"),
    ("Timothy", "Tim"),
    ("Victoria", "Tori"),
    ("Victoria", "Vicky"),
    ("William", "Bill"),
    ("William", "Billy"),
    ("William", "Liam"),
    ("William", "Will"),
    ("Zachary", "Zach"),
];

/// Seed events for every table entry the store does not already hold,
/// in any status. Deprecated seeds stay deprecated.
pub fn missing_seed_events(store: &NicknameStore, confidence: f64) -> Vec<AliasEvent> {
    SEED_ALIASES
        .iter()
        .filter(|(canonical, alias)| store.get(canonical, alias).is_none())
        .map(|(canonical, alias)| AliasEvent::AliasSeeded {
            canonical_first: (*canonical).to_string(),
            alias_token: (*alias).to_string(),
            confidence,
        })
        .collect()
}
