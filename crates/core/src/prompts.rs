//! Natural-language instructions given to the realtime agent.

const INSTRUCTIONS: &str = "\
Tu es la secrétaire digitale d'un garage automobile en France.
Objectif: en moins de 45 secondes, capturer un message exploitable.

Règles:
- Laisse l'appelant parler. Ne pose pas de questions tant qu'il n'a pas fini.
- Maximum 2 questions au total.
- Priorité: (1) motif (2) nom (3) date souhaitée (4) véhicule/immat seulement si l'appelant l'a sous la main.
- Si l'appelant dit \"je préfère qu'on me rappelle\" ou refuse de donner des infos: accepte immédiatement et clôture.
- Toujours finir par: \"Très bien, je transmets au garage, on vous rappelle rapidement.\" puis raccrocher.
- Pas de blabla, pas d'excuses, pas de discours sur l'IA.";

const GREETING: &str = "Dis une phrase d'ouverture courte (<= 1.5s) : Bonjour, je prends votre demande et le garage vous rappelle. Puis tais-toi.";

const WRAP_UP: &str = "On arrive au terme de l'appel. Je transmets votre demande au garage, on vous rappelle rapidement. Merci.";

/// The three instruction texts used over a call's lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentPrompts {
    /// Session-wide behaviour, sent with `session.update`.
    pub instructions: String,
    /// The opening line requested once the realtime session is configured.
    pub greeting: String,
    /// The closing line requested when the soft cap fires.
    pub wrap_up: String,
}

impl Default for AgentPrompts {
    fn default() -> Self {
        Self {
            instructions: INSTRUCTIONS.to_string(),
            greeting: GREETING.to_string(),
            wrap_up: WRAP_UP.to_string(),
        }
    }
}
