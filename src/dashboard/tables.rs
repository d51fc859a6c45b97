//! The table of newly registered customers.

use maud::{Markup, html};
use time::UtcOffset;

use crate::{
    backend::Customer,
    html::{TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, format_date},
    timestamp::parse_timestamp,
};

pub(super) fn recent_customers_table(customers: &[Customer], local_offset: UtcOffset) -> Markup {
    html! {
        section id="recent-customers" class="w-full mb-8"
        {
            h3 class="text-xl font-semibold mb-4" { "Recent Customers" }

            div class="overflow-x-auto rounded-lg shadow"
            {
                table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Mobile" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Branch" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Registered" }
                        }
                    }

                    tbody
                    {
                        @for customer in customers {
                            tr class=(TABLE_ROW_STYLE)
                            {
                                th
                                    scope="row"
                                    class="px-6 py-4 font-medium text-gray-900 whitespace-nowrap dark:text-white"
                                {
                                    (customer.full_name())
                                }
                                td class=(TABLE_CELL_STYLE) { (customer.mobile.as_deref().unwrap_or("-")) }
                                td class=(TABLE_CELL_STYLE) { (customer.branch.as_deref().unwrap_or("-")) }
                                td class=(TABLE_CELL_STYLE)
                                {
                                    (format_date(parse_timestamp(&customer.created_at, local_offset), local_offset))
                                }
                            }
                        }

                        @if customers.is_empty() {
                            tr
                            {
                                td colspan="4" class="px-6 py-4 text-center" { "No customers registered yet." }
                            }
                        }
                    }
                }
            }
        }
    }
}
