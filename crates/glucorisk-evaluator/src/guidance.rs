//! Fixed recommendation text attached to each tier

use crate::tier::RiskTier;
use glucorisk_core::Locale;
use serde::Serialize;

/// Heading plus bullet recommendations for one (tier, locale) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Guidance {
    pub heading: &'static str,
    pub recommendations: &'static [&'static str],
}

impl Guidance {
    /// Look up the text for a tier
    pub fn for_tier(tier: RiskTier, locale: Locale) -> Self {
        match (tier, locale) {
            (RiskTier::Low, Locale::En) => LOW_EN,
            (RiskTier::Low, Locale::Es) => LOW_ES,
            (RiskTier::Moderate, Locale::En) => MODERATE_EN,
            (RiskTier::Moderate, Locale::Es) => MODERATE_ES,
            (RiskTier::High, Locale::En) => HIGH_EN,
            (RiskTier::High, Locale::Es) => HIGH_ES,
        }
    }

    /// Heading followed by one `- ` line per recommendation
    pub fn text(&self) -> String {
        let mut out = String::from(self.heading);
        for rec in self.recommendations {
            out.push_str("\n- ");
            out.push_str(rec);
        }
        out
    }
}

/// Standard notice that the estimate is not a diagnosis
pub fn disclaimer(locale: Locale) -> &'static str {
    match locale {
        Locale::En => {
            "This tool provides a data-based risk estimate only. It is not a medical \
             diagnosis and does not replace professional medical evaluation."
        }
        Locale::Es => {
            "Esta herramienta ofrece una estimación basada en datos. No es un diagnóstico \
             médico y no reemplaza una evaluación médica profesional."
        }
    }
}

const LOW_EN: Guidance = Guidance {
    heading: "Tips:",
    recommendations: &[
        "Maintain your healthy habits",
        "Get regular checkups",
        "Watch for changes in your risk factors",
    ],
};

const LOW_ES: Guidance = Guidance {
    heading: "Consejos:",
    recommendations: &[
        "Mantén tus hábitos saludables",
        "Realiza chequeos periódicos",
        "Observa cambios en tu salud",
    ],
};

const MODERATE_EN: Guidance = Guidance {
    heading: "Recommendations:",
    recommendations: &[
        "Consult a doctor for confirmation",
        "Monitor your glucose levels",
        "Adjust diet and exercise",
    ],
};

const MODERATE_ES: Guidance = Guidance {
    heading: "Recomendaciones:",
    recommendations: &[
        "Consulte a un médico para confirmar",
        "Monitoree sus niveles de glucosa",
        "Ajuste dieta y ejercicio",
    ],
};

const HIGH_EN: Guidance = Guidance {
    heading: "Urgent actions:",
    recommendations: &[
        "Consult your doctor as soon as possible",
        "Monitor blood sugar levels regularly",
        "Increase physical activity",
        "Review your diet with a nutritionist",
    ],
};

const HIGH_ES: Guidance = Guidance {
    heading: "Acciones urgentes:",
    recommendations: &[
        "Consulte a un médico lo antes posible",
        "Controle sus niveles de glucosa regularmente",
        "Aumente su actividad física",
        "Revise su dieta con un nutricionista",
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_guidance_mentions_healthy_habits() {
        let text = Guidance::for_tier(RiskTier::Low, Locale::En).text();
        assert!(text.contains("Maintain your healthy habits"));
        assert!(text.starts_with("Tips:\n- "));
    }

    #[test]
    fn test_every_pair_has_text() {
        for tier in [RiskTier::Low, RiskTier::Moderate, RiskTier::High] {
            for locale in [Locale::En, Locale::Es] {
                let g = Guidance::for_tier(tier, locale);
                assert!(!g.heading.is_empty());
                assert!(!g.recommendations.is_empty());
            }
        }
    }

    #[test]
    fn test_tiers_have_distinct_text() {
        let low = Guidance::for_tier(RiskTier::Low, Locale::Es);
        let high = Guidance::for_tier(RiskTier::High, Locale::Es);
        assert_ne!(low, high);
        assert_ne!(disclaimer(Locale::En), disclaimer(Locale::Es));
    }
}
