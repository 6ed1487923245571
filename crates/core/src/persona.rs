//! Audience Personas
//!
//! The closed set of gaming-community viewpoints the Audience Persona agent
//! can role-play. Personas carry no state between rounds.

use rand::seq::IndexedRandom;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PersonaKind {
    CasualMobileGamer,
    CompetitiveEsportsFan,
    RetroIndieEnthusiast,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Unknown persona '{0}'. Expected one of: chloe, tyler, pete")]
pub struct UnknownPersona(pub String);

impl FromStr for PersonaKind {
    type Err = UnknownPersona;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "chloe" | "casual" | "casualchloe" | "casual_mobile_gamer" => {
                Ok(PersonaKind::CasualMobileGamer)
            }
            "tyler" | "esports" | "tryhard_tyler" | "competitive_esports_fan" => {
                Ok(PersonaKind::CompetitiveEsportsFan)
            }
            "pete" | "retro" | "indie" | "pixelpete" | "retro_indie_enthusiast" => {
                Ok(PersonaKind::RetroIndieEnthusiast)
            }
            _ => Err(UnknownPersona(s.to_string())),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct Persona {
    pub kind: PersonaKind,
    /// The handle the reaction is attributed to.
    pub handle: &'static str,
    pub description: &'static str,
    pub system_prompt: &'static str,
}

impl Persona {
    pub fn of(kind: PersonaKind) -> &'static Persona {
        match kind {
            PersonaKind::CasualMobileGamer => &PERSONAS[0],
            PersonaKind::CompetitiveEsportsFan => &PERSONAS[1],
            PersonaKind::RetroIndieEnthusiast => &PERSONAS[2],
        }
    }

    pub fn random() -> &'static Persona {
        PERSONAS.choose(&mut rand::rng()).unwrap_or(&PERSONAS[0])
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.handle, self.description)
    }
}

pub static PERSONAS: [Persona; 3] = [
    Persona {
        kind: PersonaKind::CasualMobileGamer,
        handle: "CasualChloe",
        description: "Casual mobile gamer",
        system_prompt: "You are CasualChloe, a casual mobile gamer who plays on your phone \
during commutes and breaks: Among Us, Genshin, whatever is trending on the app store. \
You say \"lol\", \"ngl\", \"lowkey\" and \"fr fr\". You do not care about frame rates or metas. \
You stop scrolling for things that are funny, relatable or dramatic, and you judge a post in \
about two seconds. React like you are texting a friend about something on your feed: your gut \
reaction, whether you would like, comment, share or scroll past, what grabbed you (or didn't), \
and a quick vibe check on whether it feels authentic or cringe. Keep it short and casual.",
    },
    Persona {
        kind: PersonaKind::CompetitiveEsportsFan,
        handle: "TryHard_Tyler",
        description: "Competitive esports fan",
        system_prompt: "You are TryHard_Tyler, a hardcore esports fan who watches every major \
tournament in Valorant, League and CS2 and knows player stats by heart. You use words like \
\"diff\", \"cope\", \"fraud\" and \"goated\". You want depth and accuracy, you call out bad or \
oversimplified takes, and you love content that starts a debate. React like you are replying in \
a Discord server: is the take valid or cap, would you reply, quote or ignore it, what did it get \
wrong, and would your community engage or clown on it. Be opinionated, not diplomatic.",
    },
    Persona {
        kind: PersonaKind::RetroIndieEnthusiast,
        handle: "PixelPete",
        description: "Retro/indie game enthusiast",
        system_prompt: "You are PixelPete, a retro and indie gaming enthusiast who thinks the \
SNES and PS1 era was the golden age. You love pixel art, chiptune, Celeste, Hollow Knight and \
Hades, and you are tired of AAA hype and live-service games. You say things like \"this has \
soul\" and \"corporate slop\". React like you are posting on a niche subreddit: does this \
interest you, would you engage or keep scrolling, how does it fit your taste for craft and \
artistry, and what would make you care if the topic is mainstream. Be genuine, not a snob.",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn of_returns_matching_persona() {
        for persona in PERSONAS.iter() {
            assert_eq!(Persona::of(persona.kind), persona);
        }
    }

    #[test]
    fn random_is_drawn_from_fixed_set() {
        for _ in 0..20 {
            let picked = Persona::random();
            assert!(PERSONAS.iter().any(|p| std::ptr::eq(p, picked)));
        }
    }

    #[test]
    fn parses_short_names() {
        assert_eq!("Chloe".parse::<PersonaKind>(), Ok(PersonaKind::CasualMobileGamer));
        assert_eq!("esports".parse::<PersonaKind>(), Ok(PersonaKind::CompetitiveEsportsFan));
        assert_eq!(" pete ".parse::<PersonaKind>(), Ok(PersonaKind::RetroIndieEnthusiast));
        assert_eq!(
            "grandma".parse::<PersonaKind>(),
            Err(UnknownPersona("grandma".into()))
        );
    }

    #[test]
    fn display_includes_description() {
        assert_eq!(
            Persona::of(PersonaKind::RetroIndieEnthusiast).to_string(),
            "PixelPete (Retro/indie game enthusiast)"
        );
    }
}
