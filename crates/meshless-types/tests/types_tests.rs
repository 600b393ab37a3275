//! Integration tests for meshless-types.

use meshless_types::constants;
use meshless_types::{MeshlessError, ParticleId, VertexId};

// ─── ID Tests ──────────────────────────────────────────────────

#[test]
fn particle_id_index() {
    let id = ParticleId(42);
    assert_eq!(id.index(), 42);
}

#[test]
fn vertex_id_from_u32() {
    let id: VertexId = 7u32.into();
    assert_eq!(id.index(), 7);
}

#[test]
fn particle_ids_order_by_index() {
    let mut ids = vec![ParticleId(3), ParticleId(1), ParticleId(2)];
    ids.sort();
    assert_eq!(ids, vec![ParticleId(1), ParticleId(2), ParticleId(3)]);
}

#[test]
fn ids_are_serializable() {
    let id = ParticleId(100);
    let json = serde_json::to_string(&id).unwrap();
    let deserialized: ParticleId = serde_json::from_str(&json).unwrap();
    assert_eq!(id, deserialized);
}

// ─── Error Tests ──────────────────────────────────────────────

#[test]
fn error_display() {
    let err = MeshlessError::DegenerateRestShape("all particles coincide".into());
    assert!(err.to_string().contains("all particles coincide"));
}

#[test]
fn out_of_bounds_display() {
    let err = MeshlessError::ParticleOutOfBounds { index: 12, count: 4 };
    let msg = err.to_string();
    assert!(msg.contains("12"));
    assert!(msg.contains("4"));
}

#[test]
fn io_error_converts() {
    fn open() -> meshless_types::MeshlessResult<()> {
        Err(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"))?;
        Ok(())
    }
    assert!(matches!(open(), Err(MeshlessError::Io(_))));
}

// ─── Constant Tests ───────────────────────────────────────────

#[test]
fn tunable_defaults_in_unit_range() {
    assert!((0.0..=1.0).contains(&constants::DEFAULT_ALPHA));
    assert!((0.0..=1.0).contains(&constants::DEFAULT_BETA));
}

#[test]
fn default_dt_is_sixty_hertz() {
    assert!((constants::DEFAULT_DT * 60.0 - 1.0).abs() < 1e-6);
}
