//mesmo schema do formulario da landing page; envio bloqueado enquanto houver
//qualquer erro de campo

///opcoes do select "Como conheceu o FALAI?"
pub const ORIGENS: [&str; 6] = [
    "whatsapp-grupo",
    "instagram",
    "indicacao",
    "google",
    "evento",
    "outro",
];

const MAX_DIGITOS_WHATSAPP: usize = 11;

#[derive(Debug, Clone, Default)]
pub struct CamposFormulario {
    pub nome: String,
    pub email: String,
    pub whatsapp: String,
    pub origem: String,
}

/// Erros por campo, no maximo um por campo. Mensagens iguais as exibidas no
/// formulario.
#[derive(Debug, Default, PartialEq)]
pub struct ErrosFormulario {
    pub nome: Option<&'static str>,
    pub email: Option<&'static str>,
    pub whatsapp: Option<&'static str>,
    pub origem: Option<&'static str>,
}

impl ErrosFormulario {
    pub fn vazio(&self) -> bool {
        self.nome.is_none()
            && self.email.is_none()
            && self.whatsapp.is_none()
            && self.origem.is_none()
    }
}

pub fn valida(campos: &CamposFormulario) -> Result<(), ErrosFormulario> {
    let mut erros = ErrosFormulario::default();

    if campos.nome.trim().chars().count() < 2 {
        erros.nome = Some("Informe seu nome");
    }
    if !email_valido(campos.email.trim()) {
        erros.email = Some("E-mail invalido");
    }
    if !whatsapp_valido(&campos.whatsapp) {
        erros.whatsapp = Some("WhatsApp invalido");
    }
    if !ORIGENS.contains(&campos.origem.as_str()) {
        erros.origem = Some("Selecione uma opcao");
    }

    if erros.vazio() {
        Ok(())
    } else {
        Err(erros)
    }
}

//forma minima de email: local@dominio, dominio com ponto, sem espacos
fn email_valido(email: &str) -> bool {
    let Some((local, dominio)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !dominio.is_empty()
        && dominio.contains('.')
        && !dominio.starts_with('.')
        && !dominio.ends_with('.')
        && !email.contains(char::is_whitespace)
        && !dominio.contains('@')
}

//aceita exatamente o formato que `formatar_whatsapp` produz completo:
//`(DD) DDDD-DDDD` ou `(DD) DDDDD-DDDD`
fn whatsapp_valido(whatsapp: &str) -> bool {
    let bytes = whatsapp.as_bytes();
    if !(14..=15).contains(&bytes.len()) {
        return false;
    }
    let digito = |b: u8| b.is_ascii_digit();
    let meio = bytes.len() - 10;

    bytes[0] == b'('
        && digito(bytes[1])
        && digito(bytes[2])
        && bytes[3] == b')'
        && bytes[4] == b' '
        && bytes[5..5 + meio].iter().all(|&b| digito(b))
        && bytes[5 + meio] == b'-'
        && bytes[6 + meio..].iter().all(|&b| digito(b))
}

/// Formata o WhatsApp conforme o usuario digita: descarta nao-digitos, limita
/// a 11 digitos e insere parenteses do DDD e o hifen quando ha digitos
/// suficientes. Idempotente alem dos 11 digitos.
pub fn formatar_whatsapp(bruto: &str) -> String {
    let digitos: String = bruto
        .chars()
        .filter(char::is_ascii_digit)
        .take(MAX_DIGITOS_WHATSAPP)
        .collect();

    match digitos.len() {
        0 => String::new(),
        1..=2 => format!("({digitos}"),
        3..=6 => format!("({}) {}", &digitos[..2], &digitos[2..]),
        n => {
            let corte = n - 4;
            format!("({}) {}-{}", &digitos[..2], &digitos[2..corte], &digitos[corte..])
        }
    }
}
