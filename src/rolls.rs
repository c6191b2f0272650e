use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatKind {
    Hp,
    Attack,
    Defense,
    SpecialAttack,
    SpecialDefense,
    Speed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Nature {
    pub slug: &'static str,
    pub name: &'static str,
    pub raised: Option<StatKind>,
    pub lowered: Option<StatKind>,
}

use StatKind::{Attack, Defense, Hp, SpecialAttack, SpecialDefense, Speed};

pub const NATURES: [Nature; 25] = [
    Nature { slug: "hardy", name: "Hardy", raised: None, lowered: None },
    Nature { slug: "lonely", name: "Lonely", raised: Some(Attack), lowered: Some(Defense) },
    Nature { slug: "brave", name: "Brave", raised: Some(Attack), lowered: Some(Speed) },
    Nature { slug: "adamant", name: "Adamant", raised: Some(Attack), lowered: Some(SpecialAttack) },
    Nature { slug: "naughty", name: "Naughty", raised: Some(Attack), lowered: Some(SpecialDefense) },
    Nature { slug: "bold", name: "Bold", raised: Some(Defense), lowered: Some(Attack) },
    Nature { slug: "docile", name: "Docile", raised: None, lowered: None },
    Nature { slug: "relaxed", name: "Relaxed", raised: Some(Defense), lowered: Some(Speed) },
    Nature { slug: "impish", name: "Impish", raised: Some(Defense), lowered: Some(SpecialAttack) },
    Nature { slug: "lax", name: "Lax", raised: Some(Defense), lowered: Some(SpecialDefense) },
    Nature { slug: "timid", name: "Timid", raised: Some(Speed), lowered: Some(Attack) },
    Nature { slug: "hasty", name: "Hasty", raised: Some(Speed), lowered: Some(Defense) },
    Nature { slug: "serious", name: "Serious", raised: None, lowered: None },
    Nature { slug: "jolly", name: "Jolly", raised: Some(Speed), lowered: Some(SpecialAttack) },
    Nature { slug: "naive", name: "Naive", raised: Some(Speed), lowered: Some(SpecialDefense) },
    Nature { slug: "modest", name: "Modest", raised: Some(SpecialAttack), lowered: Some(Attack) },
    Nature { slug: "mild", name: "Mild", raised: Some(SpecialAttack), lowered: Some(Defense) },
    Nature { slug: "quiet", name: "Quiet", raised: Some(SpecialAttack), lowered: Some(Speed) },
    Nature { slug: "bashful", name: "Bashful", raised: None, lowered: None },
    Nature { slug: "rash", name: "Rash", raised: Some(SpecialAttack), lowered: Some(SpecialDefense) },
    Nature { slug: "calm", name: "Calm", raised: Some(SpecialDefense), lowered: Some(Attack) },
    Nature { slug: "gentle", name: "Gentle", raised: Some(SpecialDefense), lowered: Some(Defense) },
    Nature { slug: "sassy", name: "Sassy", raised: Some(SpecialDefense), lowered: Some(Speed) },
    Nature { slug: "careful", name: "Careful", raised: Some(SpecialDefense), lowered: Some(SpecialAttack) },
    Nature { slug: "quirky", name: "Quirky", raised: None, lowered: None },
];

pub fn random_nature() -> &'static Nature {
    &NATURES[rand::rng().random_range(0..NATURES.len())]
}

pub const MAX_IV: u8 = 31;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IvSet {
    pub hp: u8,
    pub atk: u8,
    pub def: u8,
    pub spa: u8,
    pub spd: u8,
    pub spe: u8,
}

impl IvSet {
    pub fn total(&self) -> u16 {
        [self.hp, self.atk, self.def, self.spa, self.spd, self.spe]
            .iter()
            .map(|value| u16::from(*value))
            .sum()
    }
}

/// Six independent uniform rolls over the inclusive `[min, max]` range,
/// clamped to the 0..=31 IV domain.
pub fn roll_ivs(min: u8, max: u8) -> IvSet {
    let low = min.min(MAX_IV);
    let high = max.min(MAX_IV);
    let (low, high) = if low <= high { (low, high) } else { (high, low) };
    let roll = || rand::rng().random_range(low..=high);
    IvSet {
        hp: roll(),
        atk: roll(),
        def: roll(),
        spa: roll(),
        spd: roll(),
        spe: roll(),
    }
}
