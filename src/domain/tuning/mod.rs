// Gameplay tuning: static numbers and catalogs read at match start.

pub mod maps;
pub mod player;
pub mod projectile;
pub mod turn;
pub mod weapon;
