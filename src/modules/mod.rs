pub mod books;
pub mod catalog;
pub mod genres;
pub mod stock;

#[cfg(test)]
pub(crate) mod testing;

use bookshop_kernel::ModuleRegistry;

/// Register all bookshop modules with the registry.
///
/// Order matters: migrations run in this order and each table may only
/// reference tables registered before it.
pub fn register_all(registry: &mut ModuleRegistry) -> anyhow::Result<()> {
    registry.register(genres::create_module())?;
    registry.register(books::create_module())?;
    registry.register(stock::create_module())?;
    registry.register(catalog::create_module())?;
    Ok(())
}
