use chrono::{SecondsFormat, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::lead::{Atribuicao, LeadCanonico, LeadRecebido, MetaLead};

///versao de consentimento assumida quando o cliente nao envia uma
pub const VERSAO_CONSENTIMENTO_PADRAO: &str = "2026-02";

//limites por campo; texto livre nunca passa adiante sem corte
const LIMITE_NOME: usize = 120;
const LIMITE_EMAIL: usize = 160;
const LIMITE_WHATSAPP: usize = 40;
const LIMITE_ORIGEM: usize = 60;
const LIMITE_MOTIVO: usize = 240;
const LIMITE_PAGE_URL: usize = 300;
const LIMITE_TRACKING: usize = 200;

#[derive(Error, Debug, PartialEq)]
pub enum ErroCanonico {
    //os identificadores sao a propria mensagem que sobe no internal_error
    #[error("invalid_nome")]
    NomeInvalido,
    #[error("invalid_email")]
    EmailInvalido,
}

/// Canonicaliza o lead recebido: apara e limita todo texto livre, normaliza o
/// email para minusculas, sintetiza `motivo` a partir de `origem` quando
/// ausente e anexa chave de idempotencia e bloco de consentimento. `nome` e
/// `email` sao os unicos campos estritamente obrigatorios.
pub fn canonicaliza(lead: &LeadRecebido) -> Result<LeadCanonico, ErroCanonico> {
    let nome = apara(&lead.nome, LIMITE_NOME);
    if nome.is_empty() {
        return Err(ErroCanonico::NomeInvalido);
    }

    let email = apara(&lead.email, LIMITE_EMAIL).to_lowercase();
    if email.is_empty() {
        return Err(ErroCanonico::EmailInvalido);
    }

    let origem = apara(&lead.origem, LIMITE_ORIGEM);
    let motivo = lead
        .motivo
        .as_deref()
        .map(|m| apara(m, LIMITE_MOTIVO))
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("Origem declarada: {origem}"));

    Ok(LeadCanonico {
        nome,
        email,
        whatsapp: apara(&lead.whatsapp, LIMITE_WHATSAPP),
        origem,
        motivo,
        origem_form: apara(lead.origem_form.as_deref().unwrap_or_default(), LIMITE_ORIGEM),
        source: apara(lead.source.as_deref().unwrap_or_default(), LIMITE_ORIGEM),
        page_url: apara(lead.page_url.as_deref().unwrap_or_default(), LIMITE_PAGE_URL),
        event_id: apara(lead.event_id.as_deref().unwrap_or_default(), LIMITE_TRACKING),
        idempotency_key: Uuid::new_v4().to_string(),
        meta: MetaLead {
            consent_version: lead
                .consent_version
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .unwrap_or(VERSAO_CONSENTIMENTO_PADRAO)
                .to_string(),
            consent_timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            tracking: apara_tracking(&lead.atribuicao),
        },
    })
}

//apara espacos e corta em `max` caracteres, sem quebrar utf-8
fn apara(texto: &str, max: usize) -> String {
    texto.trim().chars().take(max).collect()
}

fn apara_tracking(atribuicao: &Atribuicao) -> Atribuicao {
    Atribuicao {
        utm_source: apara(&atribuicao.utm_source, LIMITE_TRACKING),
        utm_medium: apara(&atribuicao.utm_medium, LIMITE_TRACKING),
        utm_campaign: apara(&atribuicao.utm_campaign, LIMITE_TRACKING),
        utm_content: apara(&atribuicao.utm_content, LIMITE_TRACKING),
        utm_term: apara(&atribuicao.utm_term, LIMITE_TRACKING),
        fbclid: apara(&atribuicao.fbclid, LIMITE_TRACKING),
        gclid: apara(&atribuicao.gclid, LIMITE_TRACKING),
        referrer: apara(&atribuicao.referrer, LIMITE_TRACKING),
        page_path: apara(&atribuicao.page_path, LIMITE_TRACKING),
        landing_variant: apara(&atribuicao.landing_variant, LIMITE_TRACKING),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lead_valido() -> LeadRecebido {
        LeadRecebido {
            nome: "Ana".to_string(),
            email: "ANA@X.COM ".to_string(),
            whatsapp: "(11) 99999-9999".to_string(),
            origem: "instagram".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn apara_e_normaliza_campos() {
        let canonico = canonicaliza(&lead_valido()).unwrap();
        assert_eq!(canonico.nome, "Ana");
        assert_eq!(canonico.email, "ana@x.com");
        assert!(!canonico.idempotency_key.is_empty());
        assert_eq!(canonico.meta.consent_version, "2026-02");
    }

    #[test]
    fn sintetiza_motivo_a_partir_da_origem() {
        let canonico = canonicaliza(&lead_valido()).unwrap();
        assert_eq!(canonico.motivo, "Origem declarada: instagram");
    }

    #[test]
    fn motivo_explicito_tem_precedencia() {
        let mut lead = lead_valido();
        lead.motivo = Some("Quero ditar laudos".to_string());
        let canonico = canonicaliza(&lead).unwrap();
        assert_eq!(canonico.motivo, "Quero ditar laudos");
    }

    #[test]
    fn nome_so_com_espacos_falha() {
        let mut lead = lead_valido();
        lead.nome = "   ".to_string();
        assert_eq!(canonicaliza(&lead).unwrap_err(), ErroCanonico::NomeInvalido);
    }

    #[test]
    fn email_vazio_falha() {
        let mut lead = lead_valido();
        lead.email = String::new();
        assert_eq!(
            canonicaliza(&lead).unwrap_err(),
            ErroCanonico::EmailInvalido
        );
    }

    #[test]
    fn texto_livre_e_cortado_no_limite() {
        let mut lead = lead_valido();
        lead.motivo = Some("x".repeat(1000));
        let canonico = canonicaliza(&lead).unwrap();
        assert_eq!(canonico.motivo.chars().count(), 240);
    }

    #[test]
    fn cada_requisicao_ganha_chave_de_idempotencia_nova() {
        let a = canonicaliza(&lead_valido()).unwrap();
        let b = canonicaliza(&lead_valido()).unwrap();
        assert_ne!(a.idempotency_key, b.idempotency_key);
    }
}
