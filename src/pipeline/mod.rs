//! Mutation pipeline
//!
//! Composes each business mutation with its audit side-effect as one
//! atomic unit: either both persist or neither does.

pub mod pipeline;

pub use pipeline::{
    MutationPipeline, ACCION_CLIENTE_ACTUALIZADO, ACCION_CLIENTE_CREADO,
    ACCION_CLIENTE_ELIMINADO, ACCION_CONSENTIMIENTO_REGISTRADO,
};
