pub mod assinatura;
pub mod canonico;
pub mod upstream;
