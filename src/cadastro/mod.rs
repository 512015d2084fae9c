//! Lado "navegador" do pipeline: captura de atribuicao, validacao do
//! formulario e envio para o endpoint proxy. Vive como SDK de biblioteca para
//! que os mesmos contratos do formulario valham em testes de ponta a ponta.

pub mod atribuicao;
pub mod envio;
pub mod pixel;
pub mod validacao;
