//! Stock lines used when no provider can speak for a participant.

use rand::prelude::*;

pub const CANNED_SPEECHES: &[&str] = &[
    "We need to look at this carefully.",
    "Not much to go on yet. I'd like to hear the others first.",
    "Everyone is being very cautious today.",
    "Nothing special from me. I pass.",
    "If you're one of them, stop pretending otherwise.",
    "Investigator, if you're out there, now is the time to lead.",
    "I'm on the good side. That's all I can say.",
    "This one is going to be interesting.",
];

pub fn canned_speech<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    CANNED_SPEECHES
        .choose(rng)
        .copied()
        .unwrap_or("I have nothing to add.")
}
