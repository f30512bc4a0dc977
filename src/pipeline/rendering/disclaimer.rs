use crate::models::OutputLanguage;

pub const DISCLAIMER_EN: &str = "DISCLAIMER: This document has been generated with the assistance of artificial intelligence technology. While every effort has been made to ensure accuracy and compliance with applicable legal standards, this document is provided \"as is\" and does not constitute legal advice. The user is strongly advised to review and verify all contents with a qualified legal professional before submission to any court, tribunal, or government authority. The creators and operators of this application accept no liability for any errors, omissions, or consequences arising from the use of this document.\n\nGenerated via NyayMitra - AI Legal Document Assistant";

pub const DISCLAIMER_HI: &str = "अस्वीकरण: यह दस्तावेज़ कृत्रिम बुद्धिमत्ता (AI) तकनीक की सहायता से तैयार किया गया है। यथासंभव सटीकता और कानूनी मानकों के अनुपालन का प्रयास किया गया है, फिर भी यह दस्तावेज़ \"जैसा है\" के आधार पर प्रदान किया गया है और यह कानूनी सलाह नहीं है। उपयोगकर्ता को किसी भी न्यायालय, न्यायाधिकरण, या सरकारी प्राधिकरण को प्रस्तुत करने से पहले एक योग्य कानूनी पेशेवर से इसकी समीक्षा और सत्यापन कराने की दृढ़ सलाह दी जाती है।\n\nNyayMitra - AI विधिक दस्तावेज़ सहायक द्वारा निर्मित";

pub fn disclaimer_for(language: OutputLanguage) -> &'static str {
    match language {
        OutputLanguage::English => DISCLAIMER_EN,
        OutputLanguage::Hindi => DISCLAIMER_HI,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_disclaimer_disclaims_advice_and_liability() {
        let text = disclaimer_for(OutputLanguage::English);
        for needle in ["artificial intelligence", "legal advice", "no liability", "NyayMitra"] {
            assert!(text.contains(needle), "missing {needle}");
        }
    }

    #[test]
    fn hindi_disclaimer_is_selected_for_hindi() {
        let text = disclaimer_for(OutputLanguage::Hindi);
        assert!(text.contains("कानूनी सलाह"));
        assert!(text.contains("NyayMitra"));
        assert_ne!(text, DISCLAIMER_EN);
    }
}
