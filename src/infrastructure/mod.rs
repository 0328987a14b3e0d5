// Infrastructure layer
// Adapters implementing domain ports

pub mod supabase;

pub use supabase::SupabaseIdentityProvider;
