pub mod mercado_pago;
pub mod signature;
