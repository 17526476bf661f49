pub mod shared {
    pub mod core {
        pub mod primitives;
    }
    pub mod infrastructure {
        pub mod postgres;
    }
}

pub mod modules {
    pub mod visits {
        pub mod core {
            pub mod ports;
            pub mod visit_log;
            pub mod visitor;
        }
        pub mod use_cases {
            pub mod scan_visitor {
                pub mod command;
                pub mod decide;
                pub mod decision;
                pub mod handler;
                pub mod identify;
                pub mod inbound {
                    pub mod graphql;
                    pub mod http;
                }
            }
            pub mod list_scanned_visitors {
                pub mod handler;
                pub mod inbound {
                    pub mod graphql;
                    pub mod http;
                }
            }
            pub mod edit_scanned_visitor {
                pub mod command;
                pub mod handler;
                pub mod inbound {
                    pub mod http;
                }
            }
            pub mod delete_scanned_visitors {
                pub mod command;
                pub mod handler;
                pub mod inbound {
                    pub mod http;
                }
            }
        }
        pub mod adapters {
            pub mod outbound {
                pub mod directory_in_memory;
                pub mod directory_postgres;
                pub mod visit_log_store_in_memory;
                pub mod visit_log_store_postgres;
            }
        }
    }
}

pub mod shell;
